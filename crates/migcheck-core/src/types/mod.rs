//! Column type normalization and compatibility

use serde::{Deserialize, Serialize};

/// Width class of an integer-family column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntWidth {
    TinyInt,
    SmallInt,
    MediumInt,
    Int,
    BigInt,
}

impl IntWidth {
    /// Map an uppercased base keyword to its width class.
    /// `INTEGER` is folded into `INT`; display sizes are already stripped.
    fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "TINYINT" => Some(IntWidth::TinyInt),
            "SMALLINT" => Some(IntWidth::SmallInt),
            "MEDIUMINT" => Some(IntWidth::MediumInt),
            "INT" | "INTEGER" => Some(IntWidth::Int),
            "BIGINT" => Some(IntWidth::BigInt),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            IntWidth::TinyInt => "TINYINT",
            IntWidth::SmallInt => "SMALLINT",
            IntWidth::MediumInt => "MEDIUMINT",
            IntWidth::Int => "INT",
            IntWidth::BigInt => "BIGINT",
        }
    }
}

/// Normalized view of a raw declared column type.
///
/// The parser stores the full uppercased clause remainder on each column
/// (`INT UNSIGNED NOT NULL AUTO_INCREMENT`); this strips the constraint
/// noise down to the parts the compatibility check cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredType {
    /// Base type keyword with size arguments stripped, e.g. `INT`, `DECIMAL`
    pub base: String,
    /// Integer-family width, when the base is an integer keyword
    pub int_width: Option<IntWidth>,
    /// Whether the declaration carries an UNSIGNED modifier
    pub unsigned: bool,
}

impl DeclaredType {
    /// Normalize raw declared type text.
    ///
    /// Parenthesized size arguments (`INT(11)`, `DECIMAL(10,2)`) do not
    /// affect the base keyword. Only type modifiers immediately following
    /// the base are honored; the first constraint word (`NOT NULL`,
    /// `DEFAULT ...`, `AUTO_INCREMENT`, `PRIMARY KEY`, ...) ends the scan,
    /// so a quoted default can never be mistaken for a modifier.
    pub fn parse(raw: &str) -> Self {
        let stripped = strip_paren_groups(&raw.to_ascii_uppercase());
        let mut words = stripped.split_whitespace();

        let base = match words.next() {
            Some("INTEGER") => "INT".to_string(),
            Some(word) => word.to_string(),
            None => String::new(),
        };

        let mut unsigned = false;
        for word in words {
            match word {
                "UNSIGNED" => unsigned = true,
                "SIGNED" | "ZEROFILL" => {}
                _ => break,
            }
        }

        let int_width = IntWidth::from_keyword(&base);
        Self {
            base,
            int_width,
            unsigned,
        }
    }

    pub fn is_integer(&self) -> bool {
        self.int_width.is_some()
    }

    /// Judge this type as a foreign key column against the referenced
    /// column's type. Only integer-family pairs are checked for width and
    /// signedness; when neither side is integer-family no judgment is made.
    pub fn compatibility_with(&self, other: &DeclaredType) -> TypeCompatibility {
        if self.int_width.is_none() && other.int_width.is_none() {
            return TypeCompatibility::NotChecked;
        }

        if self.unsigned != other.unsigned {
            return TypeCompatibility::SignednessMismatch;
        }

        match (self.int_width, other.int_width) {
            (Some(a), Some(b)) if a != b => TypeCompatibility::WidthMismatch,
            _ => TypeCompatibility::Compatible,
        }
    }

    /// Get a human-readable name for this type
    pub fn display_name(&self) -> String {
        if self.unsigned {
            format!("{} UNSIGNED", self.base)
        } else {
            self.base.clone()
        }
    }
}

/// Result of a foreign key type compatibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCompatibility {
    /// Types agree on width and signedness
    Compatible,
    /// Exactly one side carries an UNSIGNED modifier
    SignednessMismatch,
    /// Both sides are integer-family but of different widths
    WidthMismatch,
    /// Neither side is integer-family; out of scope for this check
    NotChecked,
}

/// Remove parenthesized groups so size arguments never leak into keyword
/// scanning. Depth-tracked: `DECIMAL(10,2)` and nested groups collapse to
/// the bare keyword.
fn strip_paren_groups(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut depth = 0usize;
    for ch in s.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_do_not_change_the_type() {
        let a = DeclaredType::parse("INT UNSIGNED NOT NULL AUTO_INCREMENT");
        let b = DeclaredType::parse("INT UNSIGNED");
        assert_eq!(a, b);
        assert_eq!(a.compatibility_with(&b), TypeCompatibility::Compatible);
    }

    #[test]
    fn test_signedness_mismatch() {
        let a = DeclaredType::parse("INT");
        let b = DeclaredType::parse("INT UNSIGNED");
        assert_eq!(
            a.compatibility_with(&b),
            TypeCompatibility::SignednessMismatch
        );
    }

    #[test]
    fn test_width_mismatch() {
        let a = DeclaredType::parse("INT UNSIGNED");
        let b = DeclaredType::parse("BIGINT UNSIGNED");
        assert_eq!(a.compatibility_with(&b), TypeCompatibility::WidthMismatch);
    }

    #[test]
    fn test_integer_alias_and_display_size() {
        assert_eq!(DeclaredType::parse("INTEGER").int_width, Some(IntWidth::Int));
        assert_eq!(
            DeclaredType::parse("INT(11) UNSIGNED"),
            DeclaredType::parse("INT UNSIGNED")
        );
    }

    #[test]
    fn test_non_integer_pairs_are_not_checked() {
        let a = DeclaredType::parse("VARCHAR(255) NOT NULL");
        let b = DeclaredType::parse("TEXT");
        assert_eq!(a.base, "VARCHAR");
        assert!(!a.is_integer());
        assert_eq!(a.compatibility_with(&b), TypeCompatibility::NotChecked);
    }

    #[test]
    fn test_default_text_cannot_look_like_a_modifier() {
        let a = DeclaredType::parse("INT DEFAULT 0 UNSIGNED");
        assert!(!a.unsigned);
    }
}
