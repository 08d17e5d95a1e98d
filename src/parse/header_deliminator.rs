use nom::{
    IResult, Parser,
    bytes::complete::take_till1,
    character::complete::{char, line_ending},
    combinator::{recognize, verify},
    multi::many0_count,
    sequence::terminated,
};

/// A non-empty line ending with LF. A CR is only a terminator right before LF.
fn field_line(input: &[u8]) -> IResult<&[u8], &[u8]> {
    verify(
        terminated(take_till1(|b| b == b'\n'), char('\n')),
        |line: &[u8]| line != b"\r".as_slice(),
    )
    .parse(input)
}

pub fn field_lines(input: &[u8]) -> IResult<&[u8], &[u8]> {
    recognize(terminated(many0_count(field_line), line_ending)).parse(input)
}
