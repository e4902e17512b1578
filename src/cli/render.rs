use super::ui;
use crate::core::history::{sparkline, summarize};
use crate::core::presenter::HistoryView;
use crate::core::{Catalog, Conversion, Language, MessageKey, Panel, RateTable, ViewState, format_amount};
use comfy_table::Cell;

const CHART_WIDTH: usize = 60;

/// Renders the whole view state as terminal text in the state's language.
pub fn render(state: &ViewState, catalog: &Catalog) -> String {
    let lang = state.language;
    let mut sections = Vec::new();

    if let Some(notice) = state.notice {
        sections.push(ui::style_text(
            &catalog.text(lang, notice),
            ui::StyleType::Notice,
        ));
    }

    if let Some(error) = &state.error {
        sections.push(render_error(&error.to_string(), lang, catalog));
        if error.is_unavailable() && state.rates.is_none() {
            sections.push(ui::style_text(
                &catalog.text(lang, MessageKey::NoRates),
                ui::StyleType::Subtle,
            ));
        }
    }

    match &state.panel {
        Panel::Empty => {}
        Panel::Conversion(conversion) => sections.push(render_conversion(conversion, lang, catalog)),
        Panel::Rates => {
            if let Some(rates) = &state.rates {
                sections.push(render_rates(rates, lang, catalog));
            }
        }
        Panel::History(view) => sections.push(render_history(view, lang, catalog)),
    }

    sections.join("\n\n")
}

pub fn render_error(message: &str, lang: Language, catalog: &Catalog) -> String {
    ui::style_text(
        &format!("{}: {}", catalog.text(lang, MessageKey::Error), message),
        ui::StyleType::Error,
    )
}

fn render_conversion(conversion: &Conversion, lang: Language, catalog: &Catalog) -> String {
    let request = &conversion.request;
    let amount = format_amount(request.amount);
    let value = format_amount(conversion.value);
    let text = catalog.format(
        lang,
        MessageKey::Conversion,
        &[
            ("amount", amount.as_str()),
            ("source", request.source.as_str()),
            ("value", value.as_str()),
            ("target", request.target.as_str()),
        ],
    );
    ui::style_text(&text, ui::StyleType::Result)
}

fn render_rates(rates: &RateTable, lang: Language, catalog: &Catalog) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(&catalog.text(lang, MessageKey::Currency)),
        ui::header_cell(&catalog.text(lang, MessageKey::Rate)),
    ]);
    for (code, rate) in rates.iter() {
        table.add_row(vec![
            Cell::new(code),
            ui::rate_cell(rate, code == rates.base()),
        ]);
    }

    let mut output = ui::style_text(
        &catalog.format(lang, MessageKey::RatesTitle, &[("base", rates.base())]),
        ui::StyleType::Title,
    );
    if let Some(date) = rates.as_of() {
        let date = date.to_string();
        output.push('\n');
        output.push_str(&ui::style_text(
            &catalog.format(lang, MessageKey::RatesAsOf, &[("date", date.as_str())]),
            ui::StyleType::Subtle,
        ));
    }
    output.push_str("\n\n");
    output.push_str(&table.to_string());

    if !rates.unavailable().is_empty() {
        let codes = rates.unavailable().join(", ");
        output.push_str("\n\n");
        output.push_str(&ui::style_text(
            &catalog.format(lang, MessageKey::Unavailable, &[("codes", codes.as_str())]),
            ui::StyleType::Error,
        ));
    }
    output
}

fn render_history(view: &HistoryView, lang: Language, catalog: &Catalog) -> String {
    let pair = [("base", view.base.as_str()), ("target", view.target.as_str())];

    let Some(summary) = summarize(&view.points) else {
        return ui::style_text(
            &catalog.format(lang, MessageKey::HistoryEmpty, &pair),
            ui::StyleType::Subtle,
        );
    };

    let mut output = ui::style_text(
        &catalog.format(lang, MessageKey::HistoryTitle, &pair),
        ui::StyleType::Title,
    );
    output.push_str(&format!(
        "\n{} {}  {}\n",
        summary.first.date,
        sparkline(&view.points, CHART_WIDTH),
        summary.last.date
    ));
    let min = ui::format_rate(summary.min);
    let max = ui::format_rate(summary.max);
    let last = ui::format_rate(summary.last.close);
    let change = ui::change_text(summary.change_pct);
    output.push_str(&catalog.format(
        lang,
        MessageKey::HistoryRange,
        &[
            ("min", min.as_str()),
            ("max", max.as_str()),
            ("last", last.as_str()),
            ("change", change.as_str()),
        ],
    ));
    output
}
