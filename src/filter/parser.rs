//! Parser for the ECQL-subset filter language using nom parsers.

use super::{CompareOp, Filter, Literal};
use crate::error::{CatalogError, Result};
use geo::Point;
use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, map, value, verify},
    multi::separated_list1,
    number::complete::double,
    sequence::{delimited, pair, preceded, separated_pair, tuple},
};

/// Parse a complete filter expression.
pub fn parse(input: &str) -> Result<Filter> {
    match all_consuming(delimited(multispace0, or_expr, multispace0))(input) {
        Ok((_, filter)) => Ok(filter),
        Err(err) => Err(CatalogError::FilterParse(format!("{input:?}: {err}"))),
    }
}

fn or_expr(input: &str) -> IResult<&str, Filter> {
    let (input, first) = and_expr(input)?;
    let (input, rest) = nom::multi::many0(preceded(keyword("OR"), and_expr))(input)?;
    Ok((input, fold_binary(first, rest, Filter::Or)))
}

fn and_expr(input: &str) -> IResult<&str, Filter> {
    let (input, first) = unary_expr(input)?;
    let (input, rest) = nom::multi::many0(preceded(keyword("AND"), unary_expr))(input)?;
    Ok((input, fold_binary(first, rest, Filter::And)))
}

fn fold_binary(
    first: Filter,
    rest: Vec<Filter>,
    combine: fn(Box<Filter>, Box<Filter>) -> Filter,
) -> Filter {
    rest.into_iter()
        .fold(first, |acc, next| combine(Box::new(acc), Box::new(next)))
}

fn unary_expr(input: &str) -> IResult<&str, Filter> {
    alt((
        map(preceded(keyword("NOT"), unary_expr), |inner| {
            Filter::Not(Box::new(inner))
        }),
        delimited(
            pair(char('('), multispace0),
            or_expr,
            pair(multispace0, char(')')),
        ),
        predicate,
    ))(input)
}

fn predicate(input: &str) -> IResult<&str, Filter> {
    alt((dwithin, str_function, in_predicate, comparison))(input)
}

/// `DWITHIN(attr, POINT(x y), distance, units)`
fn dwithin(input: &str) -> IResult<&str, Filter> {
    let (input, _) = tag_no_case("DWITHIN")(input)?;
    let (input, (attr, center, distance, multiplier)) = delimited(
        pair(multispace0, char('(')),
        tuple((
            ws(identifier),
            preceded(pair(char(','), multispace0), point_literal),
            preceded(pair(char(','), multispace0), ws(double)),
            preceded(pair(char(','), multispace0), ws(distance_unit)),
        )),
        char(')'),
    )(input)?;

    Ok((
        input,
        Filter::DWithin {
            attr: attr.to_string(),
            center,
            meters: distance * multiplier,
        },
    ))
}

/// `POINT(x y)` well-known-text point, longitude then latitude.
fn point_literal(input: &str) -> IResult<&str, Point> {
    let (input, _) = tag_no_case("POINT")(input)?;
    let (input, (x, y)) = delimited(
        tuple((multispace0, char('('), multispace0)),
        separated_pair(double, multispace1, double),
        pair(multispace0, char(')')),
    )(input)?;
    Ok((input, Point::new(x, y)))
}

/// Unit multiplier to meters.
fn distance_unit(input: &str) -> IResult<&str, f64> {
    alt((
        value(1_000.0, tag_no_case("kilometers")),
        value(1.0, tag_no_case("meters")),
        value(0.3048, tag_no_case("feet")),
        value(1_609.344, tag_no_case("miles")),
    ))(input)
}

/// `strStartsWith(attr, 'x') = true` / `strEndsWith(attr, 'x') = false`
fn str_function(input: &str) -> IResult<&str, Filter> {
    let (input, ends) = alt((
        value(true, tag_no_case("strEndsWith")),
        value(false, tag_no_case("strStartsWith")),
    ))(input)?;
    let (input, (attr, needle)) = delimited(
        pair(multispace0, char('(')),
        separated_pair(
            ws(identifier),
            pair(char(','), multispace0),
            ws(string_literal),
        ),
        char(')'),
    )(input)?;
    let (input, _) = ws(char('='))(input)?;
    let (input, expected) = bool_literal(input)?;

    let filter = if ends {
        Filter::StrEndsWith {
            attr: attr.to_string(),
            suffix: needle,
        }
    } else {
        Filter::StrStartsWith {
            attr: attr.to_string(),
            prefix: needle,
        }
    };

    Ok((
        input,
        if expected {
            filter
        } else {
            Filter::Not(Box::new(filter))
        },
    ))
}

/// `attr IN (v1, v2, ...)`
fn in_predicate(input: &str) -> IResult<&str, Filter> {
    let (input, attr) = identifier(input)?;
    let (input, _) = delimited(multispace1, tag_no_case("IN"), multispace0)(input)?;
    let (input, values) = delimited(
        char('('),
        separated_list1(pair(char(','), multispace0), ws(literal)),
        char(')'),
    )(input)?;

    Ok((
        input,
        Filter::In {
            attr: attr.to_string(),
            values,
        },
    ))
}

/// `attr <op> literal`
fn comparison(input: &str) -> IResult<&str, Filter> {
    let (input, attr) = identifier(input)?;
    let (input, op) = ws(compare_op)(input)?;
    let (input, value) = literal(input)?;

    Ok((
        input,
        Filter::Compare {
            attr: attr.to_string(),
            op,
            value,
        },
    ))
}

fn compare_op(input: &str) -> IResult<&str, CompareOp> {
    alt((
        value(CompareOp::Le, tag("<=")),
        value(CompareOp::Ne, tag("<>")),
        value(CompareOp::Ge, tag(">=")),
        value(CompareOp::Lt, tag("<")),
        value(CompareOp::Gt, tag(">")),
        value(CompareOp::Eq, tag("=")),
    ))(input)
}

fn literal(input: &str) -> IResult<&str, Literal> {
    alt((
        map(bool_literal, Literal::Bool),
        map(string_literal, Literal::Str),
        map(double, Literal::Num),
    ))(input)
}

fn bool_literal(input: &str) -> IResult<&str, bool> {
    alt((
        value(true, keyword_tag("true")),
        value(false, keyword_tag("false")),
    ))(input)
}

/// A single-quoted string; `''` escapes a quote. Literals are UTF-8.
fn string_literal(input: &str) -> IResult<&str, String> {
    let (mut rest, _) = char('\'')(input)?;
    let mut out = String::new();
    loop {
        match rest.find('\'') {
            Some(pos) => {
                out.push_str(&rest[..pos]);
                let after = &rest[pos + 1..];
                if let Some(stripped) = after.strip_prefix('\'') {
                    out.push('\'');
                    rest = stripped;
                } else {
                    return Ok((after, out));
                }
            }
            None => {
                return Err(nom::Err::Error(nom::error::Error::new(
                    rest,
                    nom::error::ErrorKind::Char,
                )));
            }
        }
    }
}

fn identifier(input: &str) -> IResult<&str, &str> {
    verify(
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        |s: &str| s.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_'),
    )(input)
}

/// A keyword with surrounding whitespace. The right boundary is enforced by
/// `keyword_tag`, so `NOT(x)` and `NOT x` both parse.
fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    delimited(multispace0, keyword_tag(word), multispace0)
}

/// A case-insensitive word that must not run into a following identifier
/// character (so `NOTE` is an identifier, not `NOT E`).
fn keyword_tag<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input: &'a str| {
        let (rest, matched) = tag_no_case(word)(input)?;
        if rest
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Tag,
            )))
        } else {
            Ok((rest, matched))
        }
    }
}

fn ws<'a, O>(
    mut inner: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> impl FnMut(&'a str) -> IResult<&'a str, O> {
    move |input: &'a str| {
        let (input, _) = multispace0(input)?;
        let (input, out) = inner(input)?;
        let (input, _) = multispace0(input)?;
        Ok((input, out))
    }
}
