// Copyright 2019-2026 s7-client contributors. All rights reserved.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! Parser for Siemens symbolic mnemonics (`DB10.DBW4`, `MB0`, `T3`, ...).

use super::constant;
use super::error::Error;

/// A parsed memory reference, ready to dispatch through the generic area
/// read/write engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbolic {
    DbByte { db: i32, start: i32 },
    DbWord { db: i32, start: i32 },
    DbDWord { db: i32, start: i32 },
    DbBit { db: i32, start: i32, bit: u8 },
    Merker { start: i32, word_len: i32 },
    Input { start: i32, word_len: i32 },
    Output { start: i32, word_len: i32 },
    Timer { number: i32 },
    Counter { number: i32 },
}

fn invalid(input: &str) -> Error {
    Error::InvalidInput {
        input: input.to_string(),
    }
}

fn parse_i32(input: &str, s: &str) -> Result<i32, Error> {
    s.parse::<i32>().map_err(|_| invalid(input))
}

/// Parses a Siemens mnemonic after upper-casing and stripping whitespace.
pub fn parse_symbolic(variable: &str) -> Result<Symbolic, Error> {
    let cleaned: String = variable
        .to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Err(Error::InvalidInput {
            input: "input variable is empty, variable should be S7 syntax".to_string(),
        });
    }

    if cleaned.len() >= 2 && &cleaned[0..2] == "DB" {
        return parse_db(&cleaned);
    }

    let (prefix, rest) = cleaned.split_at(1);
    match prefix {
        "M" => parse_area_suffix(&cleaned, rest, Symbolic::Merker {
            start: 0,
            word_len: 0,
        }),
        "E" | "I" => parse_area_suffix(&cleaned, rest, Symbolic::Input {
            start: 0,
            word_len: 0,
        }),
        "A" | "O" => parse_area_suffix(&cleaned, rest, Symbolic::Output {
            start: 0,
            word_len: 0,
        }),
        "T" => Ok(Symbolic::Timer {
            number: parse_i32(&cleaned, rest)?,
        }),
        "C" | "Z" => Ok(Symbolic::Counter {
            number: parse_i32(&cleaned, rest)?,
        }),
        _ => Err(invalid(&cleaned)),
    }
}

fn parse_area_suffix(whole: &str, rest: &str, template: Symbolic) -> Result<Symbolic, Error> {
    if rest.is_empty() {
        return Err(invalid(whole));
    }
    let (kind, digits) = rest.split_at(1);
    let start = parse_i32(whole, digits)?;
    let word_len = match kind {
        "B" => constant::WL_BYTE,
        "W" => constant::WL_WORD,
        "D" => constant::WL_DWORD,
        _ => return Err(invalid(whole)),
    };
    Ok(match template {
        Symbolic::Merker { .. } => Symbolic::Merker { start, word_len },
        Symbolic::Input { .. } => Symbolic::Input { start, word_len },
        Symbolic::Output { .. } => Symbolic::Output { start, word_len },
        _ => unreachable!(),
    })
}

fn parse_db(whole: &str) -> Result<Symbolic, Error> {
    let parts: Vec<&str> = whole.split('.').collect();
    if parts.len() < 2 {
        return Err(Error::InvalidInput {
            input: "db area read variable should not be empty".to_string(),
        });
    }

    let db = parse_i32(whole, &parts[0][2..])?;
    let field = parts[1];
    if field.len() < 3 {
        return Err(invalid(whole));
    }
    let (kind, index_str) = field.split_at(3);

    match kind {
        "DBB" => Ok(Symbolic::DbByte {
            db,
            start: parse_i32(whole, index_str)?,
        }),
        "DBW" => Ok(Symbolic::DbWord {
            db,
            start: parse_i32(whole, index_str)?,
        }),
        "DBD" => Ok(Symbolic::DbDWord {
            db,
            start: parse_i32(whole, index_str)?,
        }),
        "DBX" => {
            let start = parse_i32(whole, index_str)?;
            let bit: u8 = parts
                .get(2)
                .ok_or_else(|| invalid(whole))?
                .parse()
                .map_err(|_| invalid(whole))?;
            if bit > 7 {
                return Err(Error::InvalidInput {
                    input: "db read bit is invalid".to_string(),
                });
            }
            Ok(Symbolic::DbBit { db, start, bit })
        }
        _ => Err(invalid(whole)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_db_word() {
        assert_eq!(
            parse_symbolic("db10.dbw4").unwrap(),
            Symbolic::DbWord { db: 10, start: 4 }
        );
    }

    #[test]
    fn parses_db_bit() {
        assert_eq!(
            parse_symbolic("DB1.DBX0.3").unwrap(),
            Symbolic::DbBit {
                db: 1,
                start: 0,
                bit: 3
            }
        );
    }

    #[test]
    fn rejects_out_of_range_bit() {
        assert!(parse_symbolic("DB1.DBX0.9").is_err());
    }

    #[test]
    fn parses_merker_byte() {
        assert_eq!(
            parse_symbolic("MB12").unwrap(),
            Symbolic::Merker {
                start: 12,
                word_len: constant::WL_BYTE
            }
        );
    }

    #[test]
    fn parses_timer_and_counter() {
        assert_eq!(parse_symbolic("T3").unwrap(), Symbolic::Timer { number: 3 });
        assert_eq!(
            parse_symbolic("C7").unwrap(),
            Symbolic::Counter { number: 7 }
        );
    }

    #[test]
    fn rejects_unrecognized_prefix() {
        assert!(parse_symbolic("XB1").is_err());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(parse_symbolic("   ").is_err());
    }
}
