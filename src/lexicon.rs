//! Lexical rules of IEC 61131-3: identifiers, reserved words, standard
//! POUs and the member layouts of the standard function blocks.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::rules::config::ValidatorConfig;
use crate::types::ElementaryKind;

/// Queries the validator needs from the language's lexical layer.
pub trait LexicalRules {
    fn is_valid_identifier(&self, s: &str) -> bool;
    fn is_keyword(&self, s: &str) -> bool;
    fn is_standard_pou_name(&self, s: &str) -> bool;
    fn is_standard_function_block_name(&self, s: &str) -> bool;
    /// Member name and type name of a standard (or configured) function
    /// block, in declaration order.
    fn function_block_members(&self, fb: &str) -> Option<&[(String, String)]>;
}

// Letters, digits and single underscores; must not start with a digit
// and must not end with an underscore.
static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Za-z]|_[A-Za-z0-9])(?:_?[A-Za-z0-9])*$").unwrap());

const KEYWORDS: &[&str] = &[
    "ACTION", "END_ACTION", "ARRAY", "OF", "AT", "CASE", "ELSE", "END_CASE", "CONFIGURATION",
    "END_CONFIGURATION", "CONSTANT", "EXIT", "FALSE", "F_EDGE", "FOR", "TO", "BY",
    "DO", "END_FOR", "FUNCTION", "END_FUNCTION", "FUNCTION_BLOCK", "END_FUNCTION_BLOCK", "IF",
    "THEN", "ELSIF", "END_IF", "INITIAL_STEP", "END_STEP", "NOT", "MOD", "AND", "OR", "XOR",
    "PROGRAM", "WITH", "END_PROGRAM", "R_EDGE", "READ_ONLY", "READ_WRITE", "REPEAT", "UNTIL",
    "END_REPEAT", "RESOURCE", "ON", "END_RESOURCE", "RETAIN", "NON_RETAIN", "RETURN", "STEP",
    "STRUCT", "END_STRUCT", "TASK", "TRANSITION", "FROM", "END_TRANSITION", "TRUE", "TYPE",
    "END_TYPE", "VAR", "END_VAR", "VAR_INPUT", "VAR_OUTPUT", "VAR_IN_OUT", "VAR_TEMP",
    "VAR_EXTERNAL", "VAR_ACCESS", "VAR_CONFIG", "VAR_GLOBAL", "WHILE", "END_WHILE", "BOOL",
    "SINT", "INT", "DINT", "LINT", "USINT", "UINT", "UDINT", "ULINT", "REAL", "LREAL", "TIME",
    "DATE", "TIME_OF_DAY", "TOD", "DATE_AND_TIME", "DT", "STRING", "WSTRING", "BYTE", "WORD",
    "DWORD", "LWORD", "ANY", "ANY_DERIVED", "ANY_ELEMENTARY", "ANY_MAGNITUDE", "ANY_NUM",
    "ANY_REAL", "ANY_INT", "ANY_BIT", "ANY_STRING", "ANY_DATE",
];

const STANDARD_FUNCTIONS: &[&str] = &[
    "ABS", "SQRT", "LN", "LOG", "EXP", "SIN", "COS", "TAN", "ASIN", "ACOS", "ATAN", "ADD", "MUL",
    "SUB", "DIV", "MOD", "EXPT", "MOVE", "SHL", "SHR", "ROR", "ROL", "AND", "OR", "XOR", "NOT",
    "SEL", "MAX", "MIN", "LIMIT", "MUX", "GT", "GE", "EQ", "LE", "LT", "NE", "LEN", "LEFT",
    "RIGHT", "MID", "CONCAT", "INSERT", "DELETE", "REPLACE", "FIND", "TRUNC", "ADD_TIME",
    "SUB_TIME", "MUL_TIME", "DIV_TIME", "CONCAT_DATE_TOD",
];

const STANDARD_FUNCTION_BLOCKS: &[(&str, &[(&str, &str)])] = &[
    ("SR", &[("S1", "BOOL"), ("R", "BOOL"), ("Q1", "BOOL")]),
    ("RS", &[("S", "BOOL"), ("R1", "BOOL"), ("Q1", "BOOL")]),
    ("R_TRIG", &[("CLK", "BOOL"), ("Q", "BOOL")]),
    ("F_TRIG", &[("CLK", "BOOL"), ("Q", "BOOL")]),
    ("CTU", &[("CU", "BOOL"), ("R", "BOOL"), ("PV", "INT"), ("Q", "BOOL"), ("CV", "INT")]),
    ("CTD", &[("CD", "BOOL"), ("LD", "BOOL"), ("PV", "INT"), ("Q", "BOOL"), ("CV", "INT")]),
    (
        "CTUD",
        &[
            ("CU", "BOOL"),
            ("CD", "BOOL"),
            ("R", "BOOL"),
            ("LD", "BOOL"),
            ("PV", "INT"),
            ("QU", "BOOL"),
            ("QD", "BOOL"),
            ("CV", "INT"),
        ],
    ),
    ("TP", &[("IN", "BOOL"), ("PT", "TIME"), ("Q", "BOOL"), ("ET", "TIME")]),
    ("TON", &[("IN", "BOOL"), ("PT", "TIME"), ("Q", "BOOL"), ("ET", "TIME")]),
    ("TOF", &[("IN", "BOOL"), ("PT", "TIME"), ("Q", "BOOL"), ("ET", "TIME")]),
];

/// The IEC 61131-3 tables, optionally extended by a [`ValidatorConfig`].
/// All lookups are case-insensitive.
#[derive(Debug, Clone)]
pub struct IecLexicon {
    keywords: HashSet<String>,
    standard_pous: HashSet<String>,
    function_blocks: HashMap<String, Vec<(String, String)>>,
}

impl Default for IecLexicon {
    fn default() -> Self {
        IecLexicon::with_config(&ValidatorConfig::default())
    }
}

impl IecLexicon {
    pub fn with_config(config: &ValidatorConfig) -> Self {
        let mut keywords: HashSet<String> = KEYWORDS.iter().map(|k| k.to_string()).collect();
        let mut standard_pous: HashSet<String> =
            STANDARD_FUNCTIONS.iter().map(|f| f.to_string()).collect();
        let mut function_blocks: HashMap<String, Vec<(String, String)>> = HashMap::new();

        // Type conversions, INT_TO_REAL and friends.
        for from in ElementaryKind::ALL {
            for to in ElementaryKind::ALL.iter().filter(|&&to| to != from) {
                standard_pous.insert(format!("{}_TO_{}", from.name(), to.name()));
            }
        }

        for (name, members) in STANDARD_FUNCTION_BLOCKS {
            let members = members
                .iter()
                .map(|(m, t)| (m.to_string(), t.to_string()))
                .collect();
            function_blocks.insert(name.to_string(), members);
            standard_pous.insert(name.to_string());
        }

        for k in config.keywords.iter().flatten() {
            keywords.insert(k.trim().to_ascii_uppercase());
        }
        for p in config.standard_pous.iter().flatten() {
            standard_pous.insert(p.trim().to_ascii_uppercase());
        }
        for fb in config.function_blocks.iter().flatten() {
            let name = fb.name.trim().to_ascii_uppercase();
            let members = fb
                .members
                .iter()
                .map(|m| (m.name.trim().to_string(), m.type_name.trim().to_string()))
                .collect();
            function_blocks.insert(name.clone(), members);
            standard_pous.insert(name);
        }

        IecLexicon { keywords, standard_pous, function_blocks }
    }
}

impl LexicalRules for IecLexicon {
    fn is_valid_identifier(&self, s: &str) -> bool {
        IDENTIFIER.is_match(s)
    }

    fn is_keyword(&self, s: &str) -> bool {
        self.keywords.contains(&s.to_ascii_uppercase())
    }

    fn is_standard_pou_name(&self, s: &str) -> bool {
        self.standard_pous.contains(&s.to_ascii_uppercase())
    }

    fn is_standard_function_block_name(&self, s: &str) -> bool {
        self.function_blocks.contains_key(&s.to_ascii_uppercase())
    }

    fn function_block_members(&self, fb: &str) -> Option<&[(String, String)]> {
        self.function_blocks.get(&fb.to_ascii_uppercase()).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::config::{parse_config_from_text, EXAMPLE_CONFIG_JSON};

    #[test]
    fn identifiers_follow_iec_syntax() {
        let lex = IecLexicon::default();
        for ok in ["Motor", "_x1", "a_b_c", "X"] {
            assert!(lex.is_valid_identifier(ok), "{ok}");
        }
        for bad in ["", "1abc", "a__b", "ab_", "a-b", "a b", "_"] {
            assert!(!lex.is_valid_identifier(bad), "{bad}");
        }
    }

    #[test]
    fn lookups_ignore_case() {
        let lex = IecLexicon::default();
        assert!(lex.is_keyword("end_if"));
        assert!(lex.is_standard_pou_name("sqrt"));
        assert!(lex.is_standard_pou_name("Ton"));
        assert!(lex.is_standard_function_block_name("ctud"));
        assert!(!lex.is_standard_function_block_name("SQRT"));
        assert!(lex.is_standard_pou_name("int_to_real"));
        assert!(lex.is_standard_pou_name("DINT_TO_STRING"));
        assert!(lex.is_standard_pou_name("Tod_To_Dint"));
        assert!(!lex.is_standard_pou_name("INT_TO_INT"));
        let ton = lex.function_block_members("ton").unwrap();
        assert_eq!(ton[1], ("PT".to_string(), "TIME".to_string()));
    }

    #[test]
    fn config_extends_tables() {
        let config = parse_config_from_text(EXAMPLE_CONFIG_JSON).unwrap();
        let lex = IecLexicon::with_config(&config);
        assert!(lex.is_keyword("this"));
        assert!(lex.is_standard_pou_name("Blink"));
        assert!(lex.is_standard_function_block_name("mc_power"));
        assert_eq!(lex.function_block_members("MC_POWER").unwrap().len(), 3);
    }
}
