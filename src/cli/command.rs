use std::path::PathBuf;
use std::str::FromStr;

use crate::wire::ReplanReason;

pub const HELP: &str = "\
Commands:
  show                         summary, budget and every day
  day N                        one day with its places
  replan N rainy|low-energy    regenerate one day
  map [FILE]                   list map markers, or write them as GeoJSON
  stay                         accommodation suggestions with booking links
  pack                         packing list
  guide                        local guide
  ask QUESTION                 ask about your plan
  expense add AMOUNT ITEM      record an expense
  expense list|total|split|clear
  note N TEXT                  journal note for a day
  export [FILE]                write the itinerary document
  regen                        generate a new plan for the same trip
  help | quit";

/// One line typed into the interactive shell.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Show,
    Day(u32),
    Replan { day: u32, reason: ReplanReason },
    Map(Option<PathBuf>),
    Stay,
    Pack,
    Guide,
    Ask(String),
    ExpenseAdd { amount: f64, item: String },
    ExpenseList,
    ExpenseTotal,
    ExpenseSplit,
    ExpenseClear,
    Note { day: u32, text: String },
    Export(Option<PathBuf>),
    Regen,
    Help,
    Quit,
}

fn day_arg(s: Option<&str>) -> Result<u32, String> {
    let raw = s.ok_or("missing day number")?;
    raw.parse::<u32>()
        .ok()
        .filter(|d| *d > 0)
        .ok_or_else(|| format!("'{raw}' is not a day number"))
}

fn rest_after<'a>(line: &'a str, words: usize) -> &'a str {
    let mut s = line.trim_start();
    for _ in 0..words {
        s = s.trim_start();
        s = s.find(char::is_whitespace).map(|i| &s[i..]).unwrap_or("");
    }
    s.trim()
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let head = words.next().ok_or("empty command")?.to_lowercase();

        match head.as_str() {
            "show" | "plan" => Ok(Command::Show),
            "day" => Ok(Command::Day(day_arg(words.next())?)),
            "replan" => {
                let day = day_arg(words.next())?;
                let reason = words.next().ok_or("missing reason (rainy or low-energy)")?.parse()?;
                Ok(Command::Replan { day, reason })
            }
            "map" => Ok(Command::Map(words.next().map(PathBuf::from))),
            "stay" | "hotels" => Ok(Command::Stay),
            "pack" => Ok(Command::Pack),
            "guide" => Ok(Command::Guide),
            "ask" => {
                let q = rest_after(line, 1);
                if q.is_empty() {
                    return Err("ask what?".into());
                }
                Ok(Command::Ask(q.to_string()))
            }
            "expense" => match words.next().map(|w| w.to_lowercase()).as_deref() {
                Some("add") => {
                    let raw = words.next().ok_or("missing amount")?;
                    let amount: f64 = raw.parse().map_err(|_| format!("'{raw}' is not an amount"))?;
                    Ok(Command::ExpenseAdd { amount, item: rest_after(line, 3).to_string() })
                }
                Some("list") | None => Ok(Command::ExpenseList),
                Some("total") => Ok(Command::ExpenseTotal),
                Some("split") => Ok(Command::ExpenseSplit),
                Some("clear") => Ok(Command::ExpenseClear),
                Some(other) => Err(format!("unknown expense action '{other}'")),
            },
            "note" => {
                let day = day_arg(words.next())?;
                Ok(Command::Note { day, text: rest_after(line, 2).to_string() })
            }
            "export" | "pdf" => Ok(Command::Export(words.next().map(PathBuf::from))),
            "regen" | "new" => Ok(Command::Regen),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(format!("unknown command '{other}', type 'help'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_replan() {
        assert_eq!(
            "replan 2 rainy".parse::<Command>(),
            Ok(Command::Replan { day: 2, reason: ReplanReason::Rainy })
        );
        assert_eq!(
            "REPLAN 3 low-energy".parse::<Command>(),
            Ok(Command::Replan { day: 3, reason: ReplanReason::LowEnergy })
        );
        assert!("replan 0 rainy".parse::<Command>().is_err());
        assert!("replan 2 sunny".parse::<Command>().is_err());
        assert!("replan two rainy".parse::<Command>().is_err());
    }

    #[test]
    fn keeps_free_text_intact() {
        assert_eq!(
            "ask  is   Baga beach crowded?".parse::<Command>(),
            Ok(Command::Ask("is   Baga beach crowded?".into()))
        );
        assert_eq!(
            "note 2 loved the  fish curry".parse::<Command>(),
            Ok(Command::Note { day: 2, text: "loved the  fish curry".into() })
        );
        assert_eq!(
            "expense add 250.5 Cab to airport".parse::<Command>(),
            Ok(Command::ExpenseAdd { amount: 250.5, item: "Cab to airport".into() })
        );
    }

    #[test]
    fn optional_paths_and_errors() {
        assert_eq!("map".parse::<Command>(), Ok(Command::Map(None)));
        assert_eq!("export out.txt".parse::<Command>(), Ok(Command::Export(Some(PathBuf::from("out.txt")))));
        assert!("".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
        assert!("expense add lots Cab".parse::<Command>().is_err());
    }
}
