//! Go source template for one table's model file.

use std::collections::HashSet;
use std::fmt::{self, Write};

use crate::synth::{CustomType, Field};

pub const GENERATED_MARKER: &str = "// Code generated by modelgen. DO NOT EDIT.";

/// Everything the template needs for one output file.
#[derive(Debug, Clone, Copy)]
pub struct ModelFile<'a> {
    pub table: &'a str,
    pub package: &'a str,
    pub model_name: &'a str,
    pub fields: &'a [Field],
    pub custom_types: &'a [CustomType],
    pub needs_time: bool,
}

impl ModelFile<'_> {
    pub fn render(&self) -> Result<String, fmt::Error> {
        let mut out = String::new();
        self.write_header(&mut out)?;
        self.write_struct(&mut out)?;
        for custom in self.custom_types {
            write_custom_type(&mut out, custom)?;
        }
        Ok(out)
    }

    fn write_header(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "{}", GENERATED_MARKER)?;
        writeln!(out, "// Source table: {}", self.table)?;
        writeln!(out)?;
        writeln!(out, "package {}", self.package)?;
        writeln!(out)?;
        if self.needs_time {
            writeln!(out, "import \"time\"")?;
            writeln!(out)?;
        }
        Ok(())
    }

    // members are column-aligned the way gofmt lays out struct fields
    fn write_struct(&self, out: &mut String) -> fmt::Result {
        let name_w = self.fields.iter().map(|f| f.name.len()).max().unwrap_or(0);
        let type_w = self.fields.iter().map(|f| f.ty.len()).max().unwrap_or(0);
        let tag_w = self.fields.iter().map(|f| f.tag.len() + 2).max().unwrap_or(0);

        writeln!(out, "type {} struct {{", self.model_name)?;
        for field in self.fields {
            let tag = format!("`{}`", field.tag);
            match &field.default_value {
                Some(default) => writeln!(
                    out,
                    "\t{:name_w$} {:type_w$} {:tag_w$} // default: {}",
                    field.name, field.ty, tag, default
                )?,
                None => writeln!(out, "\t{:name_w$} {:type_w$} {}", field.name, field.ty, tag)?,
            }
        }
        writeln!(out, "}}")
    }
}

fn write_custom_type(out: &mut String, custom: &CustomType) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "type {} {}", custom.name, custom.parent_type)?;
    writeln!(out)?;

    let consts: Vec<(String, &str)> = constant_names(&custom.name, &custom.values)
        .into_iter()
        .zip(custom.values.iter().map(String::as_str))
        .collect();
    let name_w = consts.iter().map(|(n, _)| n.len()).max().unwrap_or(0);

    writeln!(out, "const (")?;
    for (name, value) in &consts {
        writeln!(
            out,
            "\t{:name_w$} {} = {}",
            name,
            custom.name,
            go_string_literal(value)
        )?;
    }
    writeln!(out, ")")
}

/// Type name followed by the literal value, with anything a Go identifier
/// can't hold replaced by `_`.
pub fn constant_name(type_name: &str, value: &str) -> String {
    let mut name = String::with_capacity(type_name.len() + value.len());
    name.push_str(type_name);
    name.extend(
        value
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' }),
    );
    name
}

/// [`constant_name`] for every value, suffixing `_2`, `_3`, ... onto names
/// already taken so the const block never declares one twice.
pub fn constant_names(type_name: &str, values: &[String]) -> Vec<String> {
    let mut taken = HashSet::with_capacity(values.len());
    values
        .iter()
        .map(|v| {
            let base = constant_name(type_name, v);
            let mut name = base.clone();
            let mut n = 2;
            while !taken.insert(name.clone()) {
                name = format!("{}_{}", base, n);
                n += 1;
            }
            name
        })
        .collect()
}

pub fn go_string_literal(value: &str) -> String {
    let mut lit = String::with_capacity(value.len() + 2);
    lit.push('"');
    for c in value.chars() {
        match c {
            '"' => lit.push_str("\\\""),
            '\\' => lit.push_str("\\\\"),
            '\n' => lit.push_str("\\n"),
            '\t' => lit.push_str("\\t"),
            c => lit.push(c),
        }
    }
    lit.push('"');
    lit
}
