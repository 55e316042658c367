//! Spoken arithmetic: phrase normalization plus a restricted evaluator.
//!
//! Normalization maps spoken operator phrases onto symbols with a
//! longest-phrase-first word scan, so "multiplied by" can never be split
//! into "multiply" + "by". The evaluator accepts numbers, `+ - * / **`,
//! parentheses and `sqrt(...)`; any other identifier is rejected.

use crate::error::ArithmeticError;

/// Spoken phrases and their symbolic replacement, longest first.
const PHRASES: &[(&[&str], &str)] = &[
    (&["to", "the", "power", "of"], "**"),
    (&["square", "root", "of"], "sqrt("),
    (&["multiplied", "by"], "*"),
    (&["divided", "by"], "/"),
    (&["square", "root"], "sqrt("),
    (&["plus"], "+"),
    (&["minus"], "-"),
    (&["times"], "*"),
    (&["multiply"], "*"),
    (&["x"], "*"),
    (&["divide"], "/"),
    (&["over"], "/"),
    (&["power"], "**"),
    (&["squared"], "** 2"),
    (&["cubed"], "** 3"),
    (&["sqrt"], "sqrt("),
];

/// Words that carry no arithmetic meaning and are dropped.
const FILLER: &[&str] = &["calculate", "what", "what's", "whats", "is", "the", "equals"];

/// Rewrite a spoken expression into symbolic form.
///
/// Unrecognized words are kept so that [`evaluate`] can reject them.
pub fn normalize_arithmetic(text: &str) -> String {
    let cleaned = text.replace('?', " ");
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    let mut out: Vec<&str> = Vec::with_capacity(words.len());

    let mut i = 0;
    'scan: while i < words.len() {
        for (phrase, symbol) in PHRASES {
            if words[i..].starts_with(phrase) {
                out.push(*symbol);
                i += phrase.len();
                continue 'scan;
            }
        }
        if !FILLER.contains(&words[i]) {
            out.push(words[i]);
        }
        i += 1;
    }

    let mut expr = out.join(" ");
    let open = expr.matches('(').count();
    let close = expr.matches(')').count();
    for _ in close..open {
        expr.push_str(" )");
    }
    expr
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Pow,
    LParen,
    RParen,
    Sqrt,
}

fn tokenize(expr: &str) -> Result<Vec<Token>, ArithmeticError> {
    let chars: Vec<char> = expr.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ArithmeticError::InvalidNumber(literal.clone()))?;
                tokens.push(Token::Num(value));
            }
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Pow);
                i += 2;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Pow);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            c if c.is_alphabetic() => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                if word == "sqrt" {
                    tokens.push(Token::Sqrt);
                } else {
                    return Err(ArithmeticError::UnknownWord(word));
                }
            }
            other => return Err(ArithmeticError::UnexpectedToken(other.to_string())),
        }
    }

    Ok(tokens)
}

/// Deepest nesting of unary operators, parentheses and roots the parser follows.
const MAX_DEPTH: usize = 256;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Run `f` one nesting level deeper, failing past [`MAX_DEPTH`].
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ArithmeticError>,
    ) -> Result<T, ArithmeticError> {
        if self.depth >= MAX_DEPTH {
            return Err(ArithmeticError::TooDeep);
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, ArithmeticError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<f64, ArithmeticError> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    value *= self.unary()?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    let divisor = self.unary()?;
                    if divisor == 0.0 {
                        return Err(ArithmeticError::DivisionByZero);
                    }
                    value /= divisor;
                }
                _ => return Ok(value),
            }
        }
    }

    // unary := ('-' | '+') unary | power
    fn unary(&mut self) -> Result<f64, ArithmeticError> {
        self.nested(Self::unary_inner)
    }

    fn unary_inner(&mut self) -> Result<f64, ArithmeticError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    // power := primary ('**' unary)?
    fn power(&mut self) -> Result<f64, ArithmeticError> {
        let base = self.primary()?;
        if self.peek() == Some(&Token::Pow) {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    // primary := number | '(' expr ')' | 'sqrt' primary
    fn primary(&mut self) -> Result<f64, ArithmeticError> {
        self.nested(Self::primary_inner)
    }

    fn primary_inner(&mut self) -> Result<f64, ArithmeticError> {
        match self.next() {
            Some(Token::Num(value)) => Ok(value),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    Some(other) => Err(ArithmeticError::UnexpectedToken(format!("{other:?}"))),
                    None => Err(ArithmeticError::UnexpectedEnd),
                }
            }
            Some(Token::Sqrt) => Ok(self.primary()?.sqrt()),
            Some(other) => Err(ArithmeticError::UnexpectedToken(format!("{other:?}"))),
            None => Err(ArithmeticError::UnexpectedEnd),
        }
    }
}

/// Evaluate a symbolic expression produced by [`normalize_arithmetic`].
pub fn evaluate(expr: &str) -> Result<f64, ArithmeticError> {
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return Err(ArithmeticError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some(extra) = parser.peek() {
        return Err(ArithmeticError::UnexpectedToken(format!("{extra:?}")));
    }
    if !value.is_finite() {
        return Err(ArithmeticError::NotFinite);
    }
    Ok(value)
}

/// Normalize and evaluate in one step.
pub fn calculate(text: &str) -> Result<f64, ArithmeticError> {
    evaluate(&normalize_arithmetic(text))
}

/// Render a result, dropping the fractional part when it is integral.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_phrases() {
        assert_eq!(normalize_arithmetic("what is 4 plus 5"), "4 + 5");
        assert_eq!(normalize_arithmetic("square root of 9"), "sqrt( 9 )");
        assert_eq!(normalize_arithmetic("6 multiplied by 7"), "6 * 7");
        assert_eq!(normalize_arithmetic("2 to the power of 8"), "2 ** 8");
        assert_eq!(normalize_arithmetic("3 squared"), "3 ** 2");
    }

    #[test]
    fn multi_word_phrases_are_not_shadowed() {
        // Word-by-word replacement would leave a stray "by" here.
        assert_eq!(normalize_arithmetic("10 divided by 4"), "10 / 4");
        assert_eq!(normalize_arithmetic("2 to the power of 3"), "2 ** 3");
    }

    #[test]
    fn evaluates_spoken_arithmetic() {
        assert_eq!(calculate("what is 4 plus 5").unwrap(), 9.0);
        assert_eq!(calculate("square root of 9").unwrap(), 3.0);
        assert_eq!(calculate("10 minus 4 times 2").unwrap(), 2.0);
        assert_eq!(calculate("2 to the power of 10").unwrap(), 1024.0);
        assert_eq!(calculate("4 cubed").unwrap(), 64.0);
        assert_eq!(calculate("7 divided by 2").unwrap(), 3.5);
    }

    #[test]
    fn square_root_wraps_rest_of_expression() {
        assert_eq!(calculate("square root of 9 plus 7").unwrap(), 4.0);
    }

    #[test]
    fn operator_precedence() {
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
        assert_eq!(evaluate("2 ** 3 ** 2").unwrap(), 512.0);
        assert_eq!(evaluate("-2 ** 2").unwrap(), -4.0);
        assert_eq!(evaluate("2 ^ 3").unwrap(), 8.0);
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert_eq!(calculate("5 divided by 0"), Err(ArithmeticError::DivisionByZero));
    }

    #[test]
    fn rejects_identifiers_and_garbage() {
        assert_eq!(
            calculate("what is love"),
            Err(ArithmeticError::UnknownWord("love".into()))
        );
        assert!(matches!(evaluate("__import__('os')"), Err(ArithmeticError::UnexpectedToken(_))));
        assert_eq!(evaluate(""), Err(ArithmeticError::Empty));
        assert_eq!(evaluate("4 +"), Err(ArithmeticError::UnexpectedEnd));
        assert!(matches!(evaluate("4 5"), Err(ArithmeticError::UnexpectedToken(_))));
        assert!(matches!(evaluate("1.2.3"), Err(ArithmeticError::InvalidNumber(_))));
        assert_eq!(evaluate("sqrt(0 - 4)"), Err(ArithmeticError::NotFinite));
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let parens = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(evaluate(&parens), Err(ArithmeticError::TooDeep));

        let negations = format!("{}1", "- ".repeat(10_000));
        assert_eq!(evaluate(&negations), Err(ArithmeticError::TooDeep));

        let roots = format!("{}4", "sqrt ".repeat(10_000));
        assert_eq!(evaluate(&roots), Err(ArithmeticError::TooDeep));

        let spoken = format!("calculate {}1", "minus ".repeat(10_000));
        assert_eq!(calculate(&spoken), Err(ArithmeticError::TooDeep));
    }

    #[test]
    fn moderate_nesting_still_evaluates() {
        let parens = format!("{}2{}", "(".repeat(50), ")".repeat(50));
        assert_eq!(evaluate(&parens).unwrap(), 2.0);
        assert_eq!(evaluate("- - - 3").unwrap(), -3.0);
    }

    #[test]
    fn formats_results() {
        assert_eq!(format_number(9.0), "9");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(3.5), "3.5");
    }
}
