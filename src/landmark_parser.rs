use nom::branch::alt;
use nom::character::complete::{char, space0, space1};
use nom::combinator::{all_consuming, map, opt, rest};
use nom::number::complete::float;
use nom::sequence::{preceded, tuple};
use nom::IResult;

use crate::{Error, Landmarks, Result, Vector2};

// `,` with optional padding, or plain whitespace.
fn separator(input: &str) -> IResult<&str, ()> {
    alt((
        map(tuple((space0, char(','), space0)), |_| ()),
        map(space1, |_| ())
    ))(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
    preceded(char('#'), rest)(input)
}

// x y [z] [# comment]
fn point(input: &str) -> IResult<&str, Vector2> {
    let (input, _) = space0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = separator(input)?;
    let (input, y) = float(input)?;
    // Depth is meaningless once the mesh is flattened onto the frame.
    let (input, _z) = opt(preceded(separator, float))(input)?;
    let (input, _) = space0(input)?;
    let (input, _) = opt(comment)(input)?;

    Ok((input, Vector2::new(x, y)))
}

pub fn parse_landmarks(text: &str) -> Result<Landmarks> {
    let mut points = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match all_consuming(point)(line) {
            Ok((_, p)) => points.push(p),
            Err(_) => return Err(Error::Parse {
                line: i + 1,
                message: format!("expected `x y [z]`, found {:?}", trimmed)
            })
        }
    }

    Ok(Landmarks::new(points))
}
