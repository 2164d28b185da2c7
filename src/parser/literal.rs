//! Parser and evaluator for IEC 61131-3 literal expressions, used to check
//! initial values. Implemented with Pest plus a Pratt parser for operator
//! precedence.
//!
//! A parsed [`LiteralExpr`] is self-contained: there is no parser state to
//! reset between calls, every query is answered from the expression itself.

use once_cell::sync::Lazy;
use pest::error::LineColLocation;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest::Parser;

use crate::types::ElementaryKind;

#[derive(pest_derive::Parser)]
#[grammar = "parser/literal.pest"]
struct LiteralParser;

// Operator precedence, loosest first.
static PRATT_PARSER: Lazy<PrattParser<Rule>> = Lazy::new(|| {
    PrattParser::new()
        .op(Op::infix(Rule::or, Assoc::Left))
        .op(Op::infix(Rule::xor, Assoc::Left))
        .op(Op::infix(Rule::and, Assoc::Left))
        .op(Op::infix(Rule::add, Assoc::Left) | Op::infix(Rule::sub, Assoc::Left))
        .op(Op::infix(Rule::mul, Assoc::Left)
            | Op::infix(Rule::div, Assoc::Left)
            | Op::infix(Rule::modulo, Assoc::Left))
        .op(Op::prefix(Rule::neg) | Op::prefix(Rule::pos) | Op::prefix(Rule::not))
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDate {
    pub year: u32,
    pub month: u32,
    pub day: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// Fractional second digits as written, possibly empty.
    pub fraction: String,
}

/// Leaf values of a literal expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i128),
    Real(f64),
    /// Milliseconds.
    Duration(f64),
    Date(CalendarDate),
    TimeOfDay(ClockTime),
    DateAndTime(CalendarDate, ClockTime),
    /// Raw text between single quotes, escapes already checked.
    Str(String),
    /// Raw text between double quotes, escapes already checked.
    WStr(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    /// `INT#5`, `REAL#-1.5`, ...
    Typed(ElementaryKind, Value),
    Identifier(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

/// A successfully parsed literal expression.
#[derive(Debug, Clone)]
pub struct LiteralExpr {
    text: String,
    root: Expr,
}

/// Parses `text` as a literal expression. The error string is meant to be
/// shown to the user as-is.
pub fn parse_expr(text: &str) -> Result<LiteralExpr, String> {
    let trimmed = text.trim();
    let mut pairs = LiteralParser::parse(Rule::literal_expr, trimmed).map_err(|e| {
        let column = match e.line_col {
            LineColLocation::Pos((_, col)) => col,
            LineColLocation::Span((_, col), _) => col,
        };
        format!(
            "The initial value \"{}\" is not a valid literal expression (column {}).",
            trimmed, column
        )
    })?;
    let expr = pairs
        .next()
        .and_then(|top| top.into_inner().find(|p| p.as_rule() == Rule::expr))
        .ok_or_else(|| format!("The initial value \"{}\" is empty.", trimmed))?;
    let root = build_expr(expr.into_inner())
        .map_err(|reason| format!("The initial value \"{}\" is invalid: {}.", trimmed, reason))?;
    Ok(LiteralExpr {
        text: trimmed.to_string(),
        root,
    })
}

fn build_expr(pairs: Pairs<Rule>) -> Result<Expr, String> {
    PRATT_PARSER
        .map_primary(build_primary)
        .map_prefix(|op, rhs| {
            let op = match op.as_rule() {
                Rule::neg => UnaryOp::Neg,
                Rule::pos => UnaryOp::Pos,
                _ => UnaryOp::Not,
            };
            Ok(Expr::Unary(op, Box::new(rhs?)))
        })
        .map_infix(|lhs, op, rhs| {
            let op = match op.as_rule() {
                Rule::add => BinOp::Add,
                Rule::sub => BinOp::Sub,
                Rule::mul => BinOp::Mul,
                Rule::div => BinOp::Div,
                Rule::modulo => BinOp::Mod,
                Rule::and => BinOp::And,
                Rule::or => BinOp::Or,
                _ => BinOp::Xor,
            };
            Ok(Expr::Binary(op, Box::new(lhs?), Box::new(rhs?)))
        })
        .parse(pairs)
}

fn build_primary(pair: Pair<Rule>) -> Result<Expr, String> {
    match pair.as_rule() {
        Rule::expr => build_expr(pair.into_inner()),
        Rule::identifier => Ok(Expr::Identifier(pair.as_str().to_string())),
        Rule::typed_literal => build_typed(pair),
        _ => build_value(&pair).map(Expr::Literal),
    }
}

fn build_typed(pair: Pair<Rule>) -> Result<Expr, String> {
    let mut inner = pair.into_inner();
    let prefix = inner.next().map(|p| p.as_str()).unwrap_or("");
    let kind = ElementaryKind::from_name(prefix)
        .ok_or_else(|| format!("unknown type prefix {}", prefix))?;
    let mut negative = false;
    let mut value = None;
    for part in inner.flat_map(|p| p.into_inner()) {
        match part.as_rule() {
            Rule::sign => negative = part.as_str() == "-",
            _ => value = Some(build_value(&part)?),
        }
    }
    let value = value.ok_or_else(|| format!("missing value after {}#", prefix))?;
    let value = if negative {
        match value {
            Value::Int(v) => Value::Int(-v),
            Value::Real(v) => Value::Real(-v),
            _ => return Err(format!("sign not allowed on this {} value", kind)),
        }
    } else {
        value
    };
    Ok(Expr::Typed(kind, value))
}

fn build_value(pair: &Pair<Rule>) -> Result<Value, String> {
    let text = pair.as_str();
    match pair.as_rule() {
        Rule::boolean => Ok(Value::Bool(text.eq_ignore_ascii_case("TRUE"))),
        Rule::integer => parse_decimal(text).map(Value::Int),
        Rule::based_int => parse_based(text).map(Value::Int),
        Rule::real => text
            .replace('_', "")
            .parse::<f64>()
            .map(Value::Real)
            .map_err(|_| format!("malformed real {}", text)),
        Rule::single_string => {
            let inner = &text[1..text.len() - 1];
            check_escapes(inner)?;
            Ok(Value::Str(inner.to_string()))
        }
        Rule::double_string => {
            let inner = &text[1..text.len() - 1];
            check_escapes(inner)?;
            Ok(Value::WStr(inner.to_string()))
        }
        Rule::duration => parse_duration(after_hash(text)).map(Value::Duration),
        Rule::date => parse_calendar(after_hash(text)).map(Value::Date),
        Rule::time_of_day => parse_clock(after_hash(text)).map(Value::TimeOfDay),
        Rule::date_and_time => {
            let body = after_hash(text);
            // yyyy-mm-dd-hh:mm:ss: the clock starts after the third '-'
            let split = body
                .match_indices('-')
                .nth(2)
                .map(|(i, _)| i)
                .ok_or_else(|| format!("malformed date and time {}", text))?;
            let date = parse_calendar(&body[..split])?;
            let clock = parse_clock(&body[split + 1..])?;
            Ok(Value::DateAndTime(date, clock))
        }
        other => Err(format!("unexpected {:?}", other)),
    }
}

fn after_hash(text: &str) -> &str {
    text.split_once('#').map(|(_, rest)| rest).unwrap_or(text)
}

fn parse_decimal(text: &str) -> Result<i128, String> {
    text.replace('_', "")
        .parse::<i128>()
        .map_err(|_| format!("integer {} out of range", text))
}

fn parse_based(text: &str) -> Result<i128, String> {
    let (base, digits) = text
        .split_once('#')
        .ok_or_else(|| format!("malformed based integer {}", text))?;
    let radix: u32 = base.parse().map_err(|_| format!("bad base {}", base))?;
    i128::from_str_radix(&digits.replace('_', ""), radix)
        .map_err(|_| format!("invalid digits for base {} in {}", radix, text))
}

fn check_escapes(inner: &str) -> Result<(), String> {
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '$' {
            continue;
        }
        match chars.next() {
            Some('$' | '\'' | '"' | 'L' | 'l' | 'N' | 'n' | 'P' | 'p' | 'R' | 'r' | 'T' | 't') => {}
            Some(h) if h.is_ascii_hexdigit() => match chars.next() {
                Some(l) if l.is_ascii_hexdigit() => {}
                _ => return Err("incomplete $hh escape".to_string()),
            },
            Some(other) => return Err(format!("invalid escape ${}", other)),
            None => return Err("dangling $ at end of string".to_string()),
        }
    }
    Ok(())
}

fn parse_duration(body: &str) -> Result<f64, String> {
    let (negative, body) = match body.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, body.strip_prefix('+').unwrap_or(body)),
    };
    let lower = body.to_ascii_lowercase();
    let mut total = 0.0;
    let mut number = String::new();
    let mut chars = lower.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_ascii_digit() || c == '.' {
            number.push(c);
            continue;
        }
        if c == '_' {
            continue;
        }
        let factor = match (c, chars.peek()) {
            ('m', Some('s')) => {
                chars.next();
                1.0
            }
            ('u', Some('s')) => {
                chars.next();
                0.001
            }
            ('n', Some('s')) => {
                chars.next();
                0.000_001
            }
            ('d', _) => 86_400_000.0,
            ('h', _) => 3_600_000.0,
            ('m', _) => 60_000.0,
            ('s', _) => 1_000.0,
            _ => return Err(format!("unknown duration unit in {}", body)),
        };
        let amount: f64 = number
            .parse()
            .map_err(|_| format!("malformed duration {}", body))?;
        total += amount * factor;
        number.clear();
    }
    Ok(if negative { -total } else { total })
}

fn parse_calendar(body: &str) -> Result<CalendarDate, String> {
    let parts: Vec<u32> = body
        .split('-')
        .map(|p| p.parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|_| format!("malformed date {}", body))?;
    let [year, month, day] = parts[..] else {
        return Err(format!("malformed date {}", body));
    };
    if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
        return Err(format!("no such date {}", body));
    }
    Ok(CalendarDate { year, month, day })
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn parse_clock(body: &str) -> Result<ClockTime, String> {
    let (hms, fraction) = match body.split_once('.') {
        Some((hms, frac)) => (hms, frac.to_string()),
        None => (body, String::new()),
    };
    let parts: Vec<u32> = hms
        .split(':')
        .map(|p| p.parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|_| format!("malformed time of day {}", body))?;
    let (hour, minute, second) = match parts[..] {
        [h, m] => (h, m, 0),
        [h, m, s] => (h, m, s),
        _ => return Err(format!("malformed time of day {}", body)),
    };
    if hour > 23 || minute > 59 || second > 59 {
        return Err(format!("no such time of day {}", body));
    }
    Ok(ClockTime { hour, minute, second, fraction })
}

impl LiteralExpr {
    /// The trimmed source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// `true` when the expression names symbols (constants, enum values,
    /// other variables) that cannot be resolved at this level.
    pub fn has_external_dependencies(&self) -> bool {
        !self.external_dependencies().is_empty()
    }

    pub fn external_dependencies(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_identifiers(&self.root, &mut out);
        out
    }

    /// Type-checks the expression against `target` and renders it in its
    /// canonical form. `None` means the value does not fit the type.
    pub fn make_canonical(&self, target: ElementaryKind) -> Option<String> {
        let evaluated = eval(&self.root)?;
        if let Some(kind) = evaluated.kind {
            if !prefix_compatible(kind, target) {
                return None;
            }
        }
        canonical(&evaluated.value, target)
    }
}

fn collect_identifiers<'a>(e: &'a Expr, out: &mut Vec<&'a str>) {
    match e {
        Expr::Identifier(name) => out.push(name),
        Expr::Unary(_, inner) => collect_identifiers(inner, out),
        Expr::Binary(_, lhs, rhs) => {
            collect_identifiers(lhs, out);
            collect_identifiers(rhs, out);
        }
        Expr::Literal(_) | Expr::Typed(..) => {}
    }
}

struct Evaluated {
    kind: Option<ElementaryKind>,
    value: Value,
}

fn eval(e: &Expr) -> Option<Evaluated> {
    match e {
        Expr::Literal(value) => Some(Evaluated { kind: None, value: value.clone() }),
        Expr::Typed(kind, value) => Some(Evaluated { kind: Some(*kind), value: value.clone() }),
        Expr::Identifier(_) => None,
        Expr::Unary(op, inner) => {
            let inner = eval(inner)?;
            let value = match (op, inner.value) {
                (UnaryOp::Pos, v @ (Value::Int(_) | Value::Real(_) | Value::Duration(_))) => v,
                (UnaryOp::Neg, Value::Int(v)) => Value::Int(v.checked_neg()?),
                (UnaryOp::Neg, Value::Real(v)) => Value::Real(-v),
                (UnaryOp::Neg, Value::Duration(v)) => Value::Duration(-v),
                (UnaryOp::Not, Value::Bool(b)) => Value::Bool(!b),
                _ => return None,
            };
            Some(Evaluated { kind: inner.kind, value })
        }
        Expr::Binary(op, lhs, rhs) => {
            let lhs = eval(lhs)?;
            let rhs = eval(rhs)?;
            let kind = match (lhs.kind, rhs.kind) {
                (Some(a), Some(b)) if a != b => return None,
                (a, b) => a.or(b),
            };
            let value = apply(*op, lhs.value, rhs.value)?;
            Some(Evaluated { kind, value })
        }
    }
}

fn apply(op: BinOp, lhs: Value, rhs: Value) -> Option<Value> {
    use Value::*;
    let value = match (op, lhs, rhs) {
        (BinOp::Add, Int(a), Int(b)) => Int(a.checked_add(b)?),
        (BinOp::Sub, Int(a), Int(b)) => Int(a.checked_sub(b)?),
        (BinOp::Mul, Int(a), Int(b)) => Int(a.checked_mul(b)?),
        (BinOp::Div, Int(a), Int(b)) => Int(a.checked_div(b)?),
        (BinOp::Mod, Int(a), Int(b)) => Int(a.checked_rem(b)?),
        (BinOp::And, Int(a), Int(b)) => Int(a & b),
        (BinOp::Or, Int(a), Int(b)) => Int(a | b),
        (BinOp::Xor, Int(a), Int(b)) => Int(a ^ b),
        (BinOp::And, Bool(a), Bool(b)) => Bool(a && b),
        (BinOp::Or, Bool(a), Bool(b)) => Bool(a || b),
        (BinOp::Xor, Bool(a), Bool(b)) => Bool(a != b),
        (op, a @ (Int(_) | Real(_)), b @ (Int(_) | Real(_))) => {
            let (a, b) = (as_f64(&a)?, as_f64(&b)?);
            match op {
                BinOp::Add => Real(a + b),
                BinOp::Sub => Real(a - b),
                BinOp::Mul => Real(a * b),
                BinOp::Div if b != 0.0 => Real(a / b),
                _ => return None,
            }
        }
        (BinOp::Add, Duration(a), Duration(b)) => Duration(a + b),
        (BinOp::Sub, Duration(a), Duration(b)) => Duration(a - b),
        (BinOp::Mul, Duration(a), b @ (Int(_) | Real(_))) => Duration(a * as_f64(&b)?),
        (BinOp::Mul, a @ (Int(_) | Real(_)), Duration(b)) => Duration(as_f64(&a)? * b),
        (BinOp::Div, Duration(a), b @ (Int(_) | Real(_))) => {
            let b = as_f64(&b)?;
            if b == 0.0 {
                return None;
            }
            Duration(a / b)
        }
        _ => return None,
    };
    Some(value)
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Int(i) => Some(*i as f64),
        Value::Real(r) => Some(*r),
        _ => None,
    }
}

/// A typed literal may initialise its own type, and integer or real
/// literals may initialise another kind of the same family.
fn prefix_compatible(prefix: ElementaryKind, target: ElementaryKind) -> bool {
    prefix == target
        || (prefix.integer_range().is_some() && target.integer_range().is_some())
        || (prefix.is_real() && target.is_real())
}

fn canonical(value: &Value, target: ElementaryKind) -> Option<String> {
    match (target, value) {
        (ElementaryKind::Bool, Value::Bool(b)) => Some(bool_text(*b)),
        (ElementaryKind::Bool, Value::Int(0)) => Some(bool_text(false)),
        (ElementaryKind::Bool, Value::Int(1)) => Some(bool_text(true)),
        (ElementaryKind::Real, v) => {
            let f = as_f64(v)?;
            (f.is_finite() && f.abs() <= f32::MAX as f64).then(|| real_text(f))
        }
        (ElementaryKind::LReal, v) => as_f64(v).filter(|f| f.is_finite()).map(real_text),
        (ElementaryKind::Time, Value::Duration(ms)) => Some(format!("T#{}ms", number_text(*ms))),
        (ElementaryKind::Date, Value::Date(d)) => Some(format!("D#{}", date_text(d))),
        (ElementaryKind::TimeOfDay, Value::TimeOfDay(t)) => Some(format!("TOD#{}", clock_text(t))),
        (ElementaryKind::DateAndTime, Value::DateAndTime(d, t)) => {
            Some(format!("DT#{}-{}", date_text(d), clock_text(t)))
        }
        (ElementaryKind::String, Value::Str(s)) => Some(format!("'{}'", s)),
        (ElementaryKind::WString, Value::WStr(s)) => Some(format!("\"{}\"", s)),
        (kind, Value::Int(v)) => {
            let (min, max) = kind.integer_range()?;
            (min..=max).contains(v).then(|| v.to_string())
        }
        _ => None,
    }
}

fn bool_text(b: bool) -> String {
    let text = if b { "TRUE" } else { "FALSE" };
    text.to_string()
}

fn real_text(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    }
}

fn number_text(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

fn date_text(d: &CalendarDate) -> String {
    format!("{:04}-{:02}-{:02}", d.year, d.month, d.day)
}

fn clock_text(t: &ClockTime) -> String {
    let base = format!("{:02}:{:02}:{:02}", t.hour, t.minute, t.second);
    if t.fraction.is_empty() {
        base
    } else {
        format!("{}.{}", base, t.fraction)
    }
}
