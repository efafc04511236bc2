//! Statement parser for whitelisted action calls.
//!
//! A statement is a snake-case identifier followed by a parenthesized,
//! literal-only argument list: `replace_text(3, 0, 0, 'Hello')`. Arguments are
//! bound by position; there is no expression evaluation of any kind, so a
//! statement can never reach anything beyond the single registered operation
//! it names.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{escaped_transform, tag},
    character::complete::{char, digit1, multispace0, none_of, satisfy},
    combinator::{all_consuming, map, map_res, opt, recognize, value},
    error::VerboseError,
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, tuple},
};

use crate::core::value::Value;

/// A parsed statement: operation name plus positional literal arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCall {
    pub name: String,
    pub args: Vec<Value>,
}

/// Parse one statement line.
///
/// The line must already have matched the statement grammar (see
/// [`crate::core::batch`]); this parser reports malformed argument lists as
/// readable errors.
pub fn parse_statement(input: &str) -> Result<ParsedCall, String> {
    let input = input.trim();
    match all_consuming(statement::<VerboseError<&str>>)(input) {
        Ok((_, call)) => Ok(call),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(nom::error::convert_error(input, e))
        }
        Err(nom::Err::Incomplete(_)) => Err("incomplete statement".to_string()),
    }
}

fn statement<'a, E>(input: &'a str) -> IResult<&'a str, ParsedCall, E>
where
    E: nom::error::ParseError<&'a str>
        + nom::error::FromExternalError<&'a str, std::num::ParseIntError>,
{
    let (input, name) = identifier(input)?;
    let (input, args) = delimited(
        preceded(multispace0, char('(')),
        separated_list0(preceded(multispace0, char(',')), preceded(multispace0, literal)),
        preceded(multispace0, char(')')),
    )(input)?;
    let (input, _) = multispace0(input)?;
    Ok((
        input,
        ParsedCall {
            name: name.to_string(),
            args,
        },
    ))
}

fn identifier<'a, E: nom::error::ParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, &'a str, E> {
    recognize(pair(
        satisfy(|c| c.is_ascii_lowercase()),
        many0(satisfy(|c| c.is_ascii_lowercase() || c == '_')),
    ))(input)
}

fn literal<'a, E>(input: &'a str) -> IResult<&'a str, Value, E>
where
    E: nom::error::ParseError<&'a str>
        + nom::error::FromExternalError<&'a str, std::num::ParseIntError>,
{
    alt((boolean, integer, string_literal))(input)
}

fn boolean<'a, E: nom::error::ParseError<&'a str>>(input: &'a str) -> IResult<&'a str, Value, E> {
    alt((
        value(Value::Bool(true), alt((tag("True"), tag("true")))),
        value(Value::Bool(false), alt((tag("False"), tag("false")))),
    ))(input)
}

fn integer<'a, E>(input: &'a str) -> IResult<&'a str, Value, E>
where
    E: nom::error::ParseError<&'a str>
        + nom::error::FromExternalError<&'a str, std::num::ParseIntError>,
{
    map_res(recognize(tuple((opt(char('-')), digit1))), |s: &str| {
        s.parse::<i64>().map(Value::Int)
    })(input)
}

fn string_literal<'a, E: nom::error::ParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, Value, E> {
    map(alt((quoted('\''), quoted('"'))), Value::Str)(input)
}

fn quoted<'a, E: nom::error::ParseError<&'a str>>(
    quote: char,
) -> impl FnMut(&'a str) -> IResult<&'a str, String, E> {
    move |input| {
        let inner = escaped_transform(
            none_of(match quote {
                '\'' => "'\\",
                _ => "\"\\",
            }),
            '\\',
            alt((
                value('\\', char('\\')),
                value('\'', char('\'')),
                value('"', char('"')),
                value('\n', char('n')),
                value('\t', char('t')),
            )),
        );
        delimited(char(quote), map(opt(inner), Option::unwrap_or_default), char(quote))(input)
    }
}
