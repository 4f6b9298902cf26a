//! Terminal demo for the object set table.
//!
//! Arrows/Tab move, Enter edits and commits, Esc discards, Space toggles
//! the row, `a` toggles all rows, `s` cycles the sort of the current column,
//! Ctrl+Up/Down drags the selection, Delete removes selected rows, `r`
//! resets the data and `q` quits.

use std::error::Error;
use std::fs::File;
use std::io::{self, Write};
use std::panic;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::terminal::{self, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};
use objectset_table::prelude::*;
use simplelog::{Config, LevelFilter, WriteLogger};

#[derive(Debug, Clone)]
struct Contact {
    name: String,
    email: String,
    city: String,
    age: Option<i64>,
    active: bool,
}

fn contact(name: &str, email: &str, city: &str, age: Option<i64>, active: bool) -> Contact {
    Contact {
        name: name.into(),
        email: email.into(),
        city: city.into(),
        age,
        active,
    }
}

fn columns() -> Vec<ColumnDef<Contact>> {
    vec![
        ColumnDef::new("name")
            .title("Name")
            .editable()
            .sortable()
            .getter(|c: &Contact| c.name.clone().into())
            .setter(|c, v| c.name = v.to_string())
            .validate_with("required")
            .props(|p| p.max_length = Some(24))
            .validate_with("max_length"),
        ColumnDef::new("email")
            .title("Email")
            .editable()
            .width(26)
            .getter(|c: &Contact| c.email.clone().into())
            .setter(|c, v| c.email = v.to_string())
            .validate_with("email")
            .on_save(FnSaveHandler(|value: &CellValue, cx: &CellContext<Contact>| {
                log::info!("Saving email {value} on row {}", cx.row);
                true
            })),
        ColumnDef::new("city")
            .title("City")
            .editable()
            .sortable()
            .getter(|c: &Contact| c.city.clone().into())
            .setter(|c, v| c.city = v.to_string()),
        ColumnDef::new("age")
            .title("Age")
            .column_type(ColumnType::Number)
            .editable()
            .sortable()
            .getter(|c: &Contact| c.age.into())
            .setter(|c, v| c.age = v.as_f64().map(|x| x as i64))
            .validate_with("range")
            .props(|p| {
                p.min = Some(0.0);
                p.max = Some(130.0);
            }),
        ColumnDef::new("active")
            .title("Active")
            .column_type(ColumnType::Boolean)
            .sortable()
            .getter(|c: &Contact| c.active.into()),
    ]
}

fn contacts() -> Vec<Contact> {
    vec![
        contact("Ada Lovelace", "ada@example.com", "London", Some(36), true),
        contact("Alan Turing", "alan@example.com", "Wilmslow", Some(41), false),
        contact("Grace Hopper", "grace@example.com", "Arlington", None, true),
        contact("Edsger Dijkstra", "edsger@example.com", "Nuenen", Some(72), true),
        contact("Barbara Liskov", "barbara@example.com", "Boston", None, false),
    ]
}

/// Restores the terminal when dropped, including on panic.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> io::Result<Self> {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let _ = restore_terminal();
            original_hook(info);
        }));
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}

fn restore_terminal() -> io::Result<()> {
    terminal::disable_raw_mode()?;
    execute!(io::stdout(), cursor::Show, LeaveAlternateScreen)?;
    Ok(())
}

fn draw(api: &TableApi<Contact>, status: &str) -> io::Result<()> {
    let mut out = io::stdout();
    queue!(out, terminal::Clear(ClearType::All), cursor::MoveTo(0, 0))?;
    if let Some(element) = api.get_table_element() {
        for line in element.to_string().lines() {
            write!(out, "{line}\r\n")?;
        }
    }
    write!(out, "\r\n{status}\r\n")?;
    out.flush()
}

/// Parse what the user typed into the value type of the column.
fn typed_value(column: ColumnType, text: &str) -> CellValue {
    match column {
        ColumnType::Number if text.trim().is_empty() => CellValue::Null,
        ColumnType::Number => match text.trim().parse::<i64>() {
            Ok(i) => CellValue::Int(i),
            Err(_) => text.into(),
        },
        _ => text.into(),
    }
}

/// Feed a key into the form of the cell being edited.
fn edit_text(api: &TableApi<Contact>, code: KeyCode) -> bool {
    let state = api.get_state();
    let Some(cell) = state.editing_cell() else {
        return false;
    };
    let (Some(form), Some(column)) = (state.form(cell), state.columns.get(cell.column)) else {
        return false;
    };
    let mut text = form.value().to_string();
    match code {
        KeyCode::Char(c) => text.push(c),
        KeyCode::Backspace => {
            text.pop();
        }
        _ => return false,
    }
    form.set_value(typed_value(column.column_type, &text));
    true
}

/// Move the dragged rows one display position up or down.
async fn nudge(api: &TableApi<Contact>, down: bool) -> String {
    let state = api.get_state();
    let Some(cell) = state.selected_cell_index else {
        return "Select a cell first".into();
    };
    let Some(payload) = api.drag_start(cell.row) else {
        return "Reordering is disabled".into();
    };
    let positions: Vec<usize> = payload
        .indexes
        .iter()
        .filter_map(|&i| state.position_of(i))
        .collect();
    let target = match (down, positions.iter().max(), positions.iter().min()) {
        (true, Some(&last), _) => last + 1,
        (false, _, Some(&first)) if first > 0 => first - 1,
        _ => return "Nowhere to move".into(),
    };
    let Some(target) = state.index_at(target).filter(|&t| api.drag_over(t)) else {
        api.drag_end();
        return "Nowhere to move".into();
    };
    let label = payload.preview.clone().unwrap_or_else(|| "1 row".into());
    if api.drop_rows(payload, target).await {
        format!("Moved {label}")
    } else {
        "Nothing moved".into()
    }
}

async fn run(table: &ObjectSetTable<Contact>) -> Result<(), Box<dyn Error>> {
    let api = table.api_ref();
    let mut events = api.subscribe();
    api.click_cell(0, 0).await;
    let mut status = String::from("q quits");
    let mut redraw = true;

    loop {
        if api.take_changed() || redraw {
            draw(api, &status)?;
            redraw = false;
        }
        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        let Event::Key(key_event) = event::read()? else {
            continue;
        };
        let Some(key) = KeyCombo::from_event(key_event) else {
            continue;
        };

        if api.is_editing() {
            redraw = edit_text(api, key_event.code);
            if !redraw {
                api.handle_key(&key).await;
            }
        } else {
            let selected = api.get_state().selected_cell_index;
            match (key.key, key.modifiers.ctrl) {
                (Key::Char('q'), false) => break,
                (Key::Char('s'), false) => {
                    if let Some(cell) = selected {
                        api.toggle_sort(cell.column).await?;
                    }
                }
                (Key::Char(' '), false) => {
                    if let Some(cell) = selected {
                        api.selection().toggle_row(cell.row);
                    }
                }
                (Key::Char('a'), false) => api.selection().toggle_select_all(),
                (Key::Char('r'), false) => api.reset_data().await,
                (Key::Up, true) => {
                    status = nudge(api, false).await;
                    redraw = true;
                }
                (Key::Down, true) => {
                    status = nudge(api, true).await;
                    redraw = true;
                }
                (Key::Delete, _) => {
                    if api.handle_document_key(&key).await.is_handled() {
                        status = format!("{} rows left", api.get_total_rows_count());
                    }
                }
                _ => {
                    api.handle_key(&key).await;
                }
            }
        }

        while let Ok(event) = events.try_recv() {
            redraw = true;
            status = match event.errors.first() {
                Some(error) => format!("{}: {error}", event.kind.name()),
                None => format!("{} at {}", event.kind.name(), event.cell()),
            };
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let log_file = File::create("objectset-demo.log").expect("Failed to create log file");
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    let config = TableConfig::<Contact>::new()
        .deletable()
        .reorderable()
        .addable(|| contact("", "", "", None, true))
        .save_timeout(Duration::from_secs(2))
        .on_delete(|rows: &[Contact]| log::info!("Deleted {} contacts", rows.len()))
        .on_reorder(|reorder| {
            log::info!("Moved {} contacts to row {}", reorder.rows.len(), reorder.target)
        });
    let table = ObjectSetTable::new(columns(), contacts(), config)?;

    let _guard = TerminalGuard::new()?;
    let result = run(&table).await;
    if let Err(e) = &result {
        log::error!("Demo failed: {e}");
    }
    result
}
