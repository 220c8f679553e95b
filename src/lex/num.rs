use nom::IResult;
use nom::InputTake;
use nom::bytes::complete::{
    tag_no_case,
    take_while,
    take_while1,
};
use nom::character::complete::{
    char as char_parse,
    one_of,
};
use nom::sequence::{
    pair,
    preceded,
    tuple,
};
use nom::branch::alt;
use nom::combinator::{ opt, recognize };
use super::{LexInput, TokenKind};

fn digits(i: LexInput) -> IResult<LexInput, LexInput> {
    // underscores may separate digits but never lead
    return recognize(
        pair(
            take_while1(|c: char| c.is_ascii_digit()),
            take_while(|c: char| c.is_ascii_digit() || c == '_'),
        )
    )(i);
}

fn radix_parse(i: LexInput) -> IResult<LexInput, LexInput> {
    return alt((
        recognize(preceded(
            tag_no_case("0x"),
            take_while1(|c: char| c.is_ascii_hexdigit() || c == '_'),
        )),
        recognize(preceded(
            tag_no_case("0b"),
            take_while1(|c: char| c == '0' || c == '1' || c == '_'),
        )),
        recognize(preceded(
            tag_no_case("0o"),
            take_while1(|c: char| ('0'..='7').contains(&c) || c == '_'),
        )),
        recognize(preceded(tag_no_case("0d"), digits)),
    ))(i);
}

fn parse_decimal(input: LexInput) -> IResult<LexInput, (LexInput, TokenKind)> {
    let (i, _whole_part) = digits(input)?;
    let (i, maybe_fraction) = opt(
        preceded(
            char_parse('.'),
            digits
        )
    )(i)?;
    let (i, maybe_exponent) = opt(
        tuple((
            one_of("eE"),
            opt(one_of("+-")),
            digits,
        ))
    )(i)?;

    let kind = match (maybe_fraction, maybe_exponent) {
        (None, None) => TokenKind::Int,
        _ => TokenKind::Float,
    };
    let consumed = input.fragment().len() - i.fragment().len();
    let (_, number) = input.take_split(consumed);
    return Ok((i, (number, kind)));
}

/**
 * Integers (decimal, or with a `0x`, `0b`, `0o`, `0d` radix prefix) and
 * floats. `1.foo` and `1..2` leave the period for the caller.
 */
pub fn parse_number(i: LexInput) -> IResult<LexInput, (LexInput, TokenKind)> {
    if let Ok((rest, number)) = radix_parse(i) {
        return Ok((rest, (number, TokenKind::Int)));
    }
    return parse_decimal(i);
}
