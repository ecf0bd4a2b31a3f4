/// Float literal lexer for vertex lines
///
/// Accepts `[-+]? digit+ '.' digit+ ([eE] [-+]? digit+)?`. A bare integer or
/// a literal without digits on both sides of the decimal point is not a match.
use nom::{
    character::complete::{char, digit1, one_of},
    combinator::{map_res, opt, recognize},
    sequence::tuple,
    IResult,
};

/// Recognize one float literal at the very start of `input`
pub fn float_literal(input: &str) -> IResult<&str, f32> {
    map_res(
        recognize(tuple((
            opt(one_of("+-")),
            digit1,
            char('.'),
            digit1,
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        str::parse::<f32>,
    )(input)
}

/// Iterator over every float literal found in a line of text.
///
/// Scans left to right. When no literal starts at the current position the
/// scanner steps one character forward; after a match it resumes right after
/// the matched text, so literals never overlap.
#[derive(Debug, Clone)]
pub struct FloatLiterals<'a> {
    rest: &'a str,
}

impl<'a> Iterator for FloatLiterals<'a> {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        while !self.rest.is_empty() {
            match float_literal(self.rest) {
                Ok((rest, value)) => {
                    self.rest = rest;
                    return Some(value);
                }
                Err(_) => {
                    let mut chars = self.rest.chars();
                    chars.next();
                    self.rest = chars.as_str();
                }
            }
        }
        None
    }
}

pub fn float_literals(line: &str) -> FloatLiterals<'_> {
    FloatLiterals { rest: line }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(line: &str) -> Vec<f32> {
        float_literals(line).collect()
    }

    #[test]
    fn test_plain_and_signed_literals() {
        assert_eq!(lex("vertex 1.5 -2.25 +3.0"), vec![1.5, -2.25, 3.0]);
    }

    #[test]
    fn test_scientific_notation() {
        let values = lex("vertex 1.000000e+01 -2.5E-1 3.0e2");
        assert_eq!(values.len(), 3);
        assert!((values[0] - 10.0).abs() < 1e-6);
        assert!((values[1] + 0.25).abs() < 1e-6);
        assert!((values[2] - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_integers_are_not_literals() {
        assert!(lex("vertex 1 2 3").is_empty());
        assert_eq!(lex("vertex 1 2.0 3"), vec![2.0]);
    }

    #[test]
    fn test_missing_fraction_digits() {
        assert!(lex("1. .5").is_empty());
    }

    #[test]
    fn test_dangling_exponent_is_left_behind() {
        assert_eq!(lex("1.5e"), vec![1.5]);
        assert_eq!(lex("1.5e+"), vec![1.5]);
    }

    #[test]
    fn test_adjacent_literals_split_on_sign() {
        assert_eq!(lex("1.0-2.0+3.0"), vec![1.0, -2.0, 3.0]);
    }

    #[test]
    fn test_literal_embedded_in_text() {
        assert_eq!(lex("vertex1.25,x--4.5"), vec![1.25, -4.5]);
    }

    #[test]
    fn test_double_decimal_point() {
        // "1.2" matches, ".3" does not
        assert_eq!(lex("1.2.3"), vec![1.2]);
    }

    #[test]
    fn test_non_ascii_text_is_skipped() {
        assert_eq!(lex("végtelen 0.5 µ 1.5"), vec![0.5, 1.5]);
    }
}
