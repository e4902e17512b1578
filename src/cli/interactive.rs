use super::{apply, render::render, ui};
use crate::core::{Action, Catalog, ConversionPresenter, ConversionRequest, Language, MessageKey, ViewState};
use anyhow::Result;
use console::Term;
use tokio::io::{AsyncBufReadExt, BufReader};

/// One line of user input, interpreted.
#[derive(Debug, PartialEq)]
pub enum Input {
    Action(Action),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

fn parse_amount(text: &str) -> Option<f64> {
    text.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}

fn is_code(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_alphabetic())
}

pub fn parse_input(line: &str) -> Input {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [] => Input::Empty,
        [cmd] if matches!(cmd.to_lowercase().as_str(), "quit" | "exit" | "q") => Input::Quit,
        [cmd] if cmd.eq_ignore_ascii_case("help") => Input::Help,
        [cmd] if cmd.eq_ignore_ascii_case("refresh") => Input::Action(Action::Refresh),
        [cmd] if cmd.eq_ignore_ascii_case("rates") => Input::Action(Action::ShowRates),
        [cmd, code] if cmd.eq_ignore_ascii_case("lang") => match code.parse::<Language>() {
            Ok(language) => Input::Action(Action::SetLanguage(language)),
            Err(_) => Input::Unknown(line.trim().to_string()),
        },
        [cmd, base, target]
            if cmd.eq_ignore_ascii_case("history") && is_code(base) && is_code(target) =>
        {
            Input::Action(Action::History {
                base: base.to_uppercase(),
                target: target.to_uppercase(),
            })
        }
        [amount, source, target] if is_code(source) && is_code(target) => {
            match parse_amount(amount) {
                Some(amount) => Input::Action(Action::Convert(ConversionRequest::new(
                    amount, source, target,
                ))),
                None => Input::Unknown(line.trim().to_string()),
            }
        }
        _ => Input::Unknown(line.trim().to_string()),
    }
}

/// Reads commands from the terminal until the user quits or input ends.
///
/// Failures are shown and the loop carries on with the previous state.
pub async fn run(
    presenter: &ConversionPresenter<'_>,
    catalog: &Catalog,
    initial: ViewState,
) -> Result<()> {
    let term = Term::stdout();
    let mut state = initial;

    println!(
        "{}\n{}",
        ui::style_text(&catalog.text(state.language, MessageKey::Title), ui::StyleType::Title),
        ui::style_text(&catalog.text(state.language, MessageKey::Prompt), ui::StyleType::Subtle)
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        term.write_str("> ")?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            Input::Empty => continue,
            Input::Quit => break,
            Input::Help => println!("{}", catalog.text(state.language, MessageKey::Help)),
            Input::Unknown(text) => println!(
                "{}",
                ui::style_text(
                    &catalog.format(state.language, MessageKey::UnknownCommand, &[("input", text.as_str())]),
                    ui::StyleType::Error,
                )
            ),
            Input::Action(action) => {
                state = apply(presenter, &state, action, catalog).await;
                println!("{}", render(&state, catalog));
            }
        }
        ui::print_separator();
    }

    println!("{}", catalog.text(state.language, MessageKey::Goodbye));
    Ok(())
}
