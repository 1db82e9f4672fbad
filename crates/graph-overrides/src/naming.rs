use std::fmt;
use std::rc::Rc;

use regex::Regex;

use crate::error::{Error, Result};

pub type NameFn = Rc<dyn Fn(&str) -> String>;
pub type ParseFn = Rc<dyn Fn(&str) -> String>;

const ROW: &str = "{row}";
const OPTION: &str = "{option}";

#[derive(Clone, Default)]
pub enum Naming {
    #[default]
    Identity,
    // e.g. `ds[{row}][{option}]`
    Template(String),
    Custom {
        name_for: NameFn,
        parse_option: ParseFn,
    },
}

impl fmt::Debug for Naming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Naming::Identity => f.write_str("Identity"),
            Naming::Template(t) => f.debug_tuple("Template").field(t).finish(),
            Naming::Custom { .. } => f.write_str("Custom"),
        }
    }
}

impl Naming {
    pub fn template(pattern: &str) -> Result<Self> {
        if pattern.matches(OPTION).count() != 1 {
            return Err(Error::msg(format!(
                "field naming template '{pattern}' must contain {OPTION} exactly once"
            )));
        }
        Ok(Naming::Template(pattern.to_string()))
    }

    pub fn bind(&self, row: Option<&str>) -> BoundNaming {
        match self {
            Naming::Identity => BoundNaming::identity(),
            Naming::Custom {
                name_for,
                parse_option,
            } => BoundNaming {
                name_for: name_for.clone(),
                parse_option: parse_option.clone(),
            },
            Naming::Template(pattern) => bind_template(pattern, row.unwrap_or("")),
        }
    }
}

fn bind_template(pattern: &str, row: &str) -> BoundNaming {
    let prefix = pattern.replace(ROW, row);
    let name_template = prefix.clone();
    let name_for: NameFn = Rc::new(move |option: &str| name_template.replace(OPTION, option));

    let source = format!(
        "^{}$",
        regex::escape(&prefix).replace(&regex::escape(OPTION), "(?P<option>.+?)")
    );
    let parse_option: ParseFn = match Regex::new(&source) {
        Ok(re) => Rc::new(move |name: &str| match re.captures(name) {
            Some(caps) => caps["option"].to_string(),
            None => {
                tracing::warn!(field = name, "field name does not match naming template");
                name.to_string()
            }
        }),
        Err(err) => {
            tracing::warn!(%err, pattern = %prefix, "naming template is not parseable; using raw names");
            Rc::new(|name: &str| name.to_string())
        }
    };

    BoundNaming {
        name_for,
        parse_option,
    }
}

#[derive(Clone)]
pub struct BoundNaming {
    name_for: NameFn,
    parse_option: ParseFn,
}

impl BoundNaming {
    pub fn identity() -> Self {
        Self {
            name_for: Rc::new(|option: &str| option.to_string()),
            parse_option: Rc::new(|name: &str| name.to_string()),
        }
    }

    pub fn name_for(&self, option: &str) -> String {
        (self.name_for)(option)
    }

    pub fn parse_option(&self, field_name: &str) -> String {
        (self.parse_option)(field_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_round_trips() {
        let n = Naming::Identity.bind(Some("3"));
        assert_eq!(n.name_for("color"), "color");
        assert_eq!(n.parse_option("color"), "color");
    }

    #[test]
    fn template_names_and_parses_fields() {
        let n = Naming::template("ds[{row}][{option}]").unwrap().bind(Some("2"));
        assert_eq!(n.name_for("timeshift"), "ds[2][timeshift]");
        assert_eq!(n.parse_option("ds[2][timeshift]"), "timeshift");
    }

    #[test]
    fn unmatched_field_name_falls_back_to_raw_name() {
        let n = Naming::template("ds[{row}][{option}]").unwrap().bind(Some("2"));
        assert_eq!(n.parse_option("other"), "other");
    }

    #[test]
    fn template_requires_option_placeholder() {
        assert!(Naming::template("ds[{row}]").is_err());
    }
}
