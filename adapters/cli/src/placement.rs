use std::{error::Error, fmt, str::FromStr};

use glam::Vec2;

/// Separates the template name from the coordinates.
const TEMPLATE_DELIMITER: char = '@';
/// Separates the two coordinates.
const COORDINATE_DELIMITER: char = ',';

/// Tower requested on the command line as `Name@x,y`.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TowerPlacement {
    /// Template to build.
    pub template: String,
    /// Centre of the footprint in field units.
    pub position: Vec2,
}

impl FromStr for TowerPlacement {
    type Err = PlacementArgError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (template, coordinates) = trimmed
            .split_once(TEMPLATE_DELIMITER)
            .ok_or(PlacementArgError::MissingPosition)?;
        let template = template.trim();
        if template.is_empty() {
            return Err(PlacementArgError::MissingTemplate);
        }

        Ok(Self {
            template: template.to_owned(),
            position: parse_coordinates(coordinates)?,
        })
    }
}

impl fmt::Display for TowerPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{TEMPLATE_DELIMITER}{}{COORDINATE_DELIMITER}{}",
            self.template, self.position.x, self.position.y
        )
    }
}

/// Errors raised while parsing a `--tower` argument.
#[derive(Debug, PartialEq)]
pub(crate) enum PlacementArgError {
    /// Nothing preceded the `@`.
    MissingTemplate,
    /// The argument had no `@` separating name and position.
    MissingPosition,
    /// The coordinates were not two finite numbers.
    InvalidCoordinates(String),
}

impl fmt::Display for PlacementArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTemplate => write!(f, "tower name is missing, expected Name@x,y"),
            Self::MissingPosition => write!(f, "tower position is missing, expected Name@x,y"),
            Self::InvalidCoordinates(coordinates) => {
                write!(f, "could not parse tower position '{coordinates}'")
            }
        }
    }
}

impl Error for PlacementArgError {}

fn parse_coordinates(coordinates: &str) -> Result<Vec2, PlacementArgError> {
    let invalid = || PlacementArgError::InvalidCoordinates(coordinates.to_owned());
    let (x, y) = coordinates
        .split_once(COORDINATE_DELIMITER)
        .ok_or_else(invalid)?;

    let x = x.trim().parse::<f32>().map_err(|_| invalid())?;
    let y = y.trim().parse::<f32>().map_err(|_| invalid())?;
    if !x.is_finite() || !y.is_finite() {
        return Err(invalid());
    }

    Ok(Vec2::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_position() {
        let placement: TowerPlacement = " Flamethrower @ 640.5, 300 ".parse().expect("valid");
        assert_eq!(placement.template, "Flamethrower");
        assert_eq!(placement.position, Vec2::new(640.5, 300.0));
        assert_eq!(placement.to_string(), "Flamethrower@640.5,300");
    }

    #[test]
    fn rejects_incomplete_arguments() {
        assert_eq!(
            "Archer".parse::<TowerPlacement>(),
            Err(PlacementArgError::MissingPosition)
        );
        assert_eq!(
            "@10,10".parse::<TowerPlacement>(),
            Err(PlacementArgError::MissingTemplate)
        );
        for coordinates in ["10", "x,10", "10,inf"] {
            assert_eq!(
                format!("Archer@{coordinates}").parse::<TowerPlacement>(),
                Err(PlacementArgError::InvalidCoordinates(coordinates.to_owned()))
            );
        }
    }
}
