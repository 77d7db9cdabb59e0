/// Page manifest parser.
///
/// One page per line:
///
/// ```text
/// # cover and first spread
/// page book-cover spread-01
/// page "spread 02" "spread 03"
/// ```
///
/// Blank lines and `#` comments are ignored. Records may also be given as a
/// JSON array of `{ "front": ..., "back": ... }` objects.
use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_while1},
    character::complete::{char, space0, space1},
    combinator::{all_consuming, map, opt, rest},
    sequence::{delimited, preceded, separated_pair, terminated, tuple},
    IResult,
};
use std::path::Path;

use crate::book::PageRecord;
use crate::error::{FolioError, FolioResult};

/// Parse a text manifest into page records, in file order.
pub fn parse_manifest(input: &str) -> FolioResult<Vec<PageRecord>> {
    let mut records = Vec::new();
    for (number, line) in input.lines().enumerate() {
        match all_consuming(parse_line)(line) {
            Ok((_, Some(record))) => records.push(record),
            Ok((_, None)) => {}
            Err(_) => {
                return Err(FolioError::ManifestParse {
                    line: number + 1,
                    message: format!("expected `page <front> <back>`, got {:?}", line.trim()),
                })
            }
        }
    }
    Ok(records)
}

/// Parse a JSON array of page records.
pub fn parse_records_json(input: &str) -> FolioResult<Vec<PageRecord>> {
    Ok(serde_json::from_str(input)?)
}

/// Load records from a file, choosing JSON for `.json` files and the text
/// manifest format otherwise.
pub fn load_records(path: impl AsRef<Path>) -> FolioResult<Vec<PageRecord>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    if path.extension().is_some_and(|ext| ext == "json") {
        parse_records_json(&text)
    } else {
        parse_manifest(&text)
    }
}

fn parse_line(input: &str) -> IResult<&str, Option<PageRecord>> {
    let (input, record) = preceded(space0, opt(parse_page))(input)?;
    let (input, _) = terminated(space0, opt(parse_comment))(input)?;
    Ok((input, record))
}

fn parse_comment(input: &str) -> IResult<&str, &str> {
    preceded(char('#'), rest)(input)
}

fn parse_page(input: &str) -> IResult<&str, PageRecord> {
    map(
        preceded(
            tuple((tag("page"), space1)),
            separated_pair(parse_identifier, space1, parse_identifier),
        ),
        |(front, back)| PageRecord::new(front, back),
    )(input)
}

fn parse_identifier(input: &str) -> IResult<&str, &str> {
    alt((parse_quoted, parse_bare))(input)
}

fn parse_quoted(input: &str) -> IResult<&str, &str> {
    delimited(
        char('"'),
        map(opt(is_not("\"")), |s| s.unwrap_or("")),
        char('"'),
    )(input)
}

fn parse_bare(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && c != '"' && c != '#')(input)
}
