use anyhow::Result;

use super::Position;
use super::Selection;

#[test]
fn it_parses_positions() -> Result<()> {
    let pos = "12:4".parse::<Position>()?;
    assert_eq!(pos, Position::new(12, 4));
    assert_eq!(pos.to_string(), "12:4");
    return Ok(());
}

#[test]
fn it_fails_to_parse_positions_without_a_column() {
    let res = "12".parse::<Position>();
    insta::assert_snapshot!(res.unwrap_err().to_string(), @"Position '12' must be formatted as LINE:COLUMN");
}

#[test]
fn it_parses_selections() -> Result<()> {
    let selection = "3:2-1:0".parse::<Selection>()?;
    assert_eq!(selection.anchor, Position::new(3, 2));
    assert_eq!(selection.head, Position::new(1, 0));
    assert_eq!(selection.start(), Position::new(1, 0));
    assert_eq!(selection.end(), Position::new(3, 2));
    assert!(!selection.is_empty());
    return Ok(());
}

#[test]
fn it_orders_positions_by_line_then_column() {
    assert!(Position::new(1, 0) > Position::new(0, 99));
    assert!(Position::new(1, 2) > Position::new(1, 1));
}
