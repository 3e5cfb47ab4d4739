//! list command - Show one page of a folder

use clap::Args;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::{CellAlignment, Table};
use ydg_core::{Action, ActionRequest, ListPage, RemoteEntry};

use crate::output::Formatter;

/// List a folder
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Folder on the disk
    #[arg(default_value = "disk:/")]
    pub path: String,

    /// Entries per page (default from config, 100 if unset)
    #[arg(short = 'n', long)]
    pub limit: Option<u32>,

    /// Entries to skip
    #[arg(long)]
    pub offset: Option<u64>,
}

impl ListArgs {
    pub fn into_request(self) -> ActionRequest {
        let mut request = ActionRequest::new(Action::List);
        request.disk_path = Some(self.path);
        request.limit = self.limit;
        request.offset = self.offset;
        request
    }
}

/// Render a page as a table
pub fn print_page(page: &ListPage, formatter: &Formatter) {
    if page.items.is_empty() {
        formatter.println(&format!("{} is empty", page.path));
        return;
    }

    formatter.println(&table(page, formatter.colors_enabled()).to_string());

    let shown_to = page.offset + page.items.len() as u64;
    let summary = match page.total {
        Some(total) => format!(
            "{}-{} of {total} in {}",
            page.offset + 1,
            shown_to,
            page.path
        ),
        None => format!("{}-{} in {}", page.offset + 1, shown_to, page.path),
    };
    formatter.println(&summary);
}

fn table(page: &ListPage, colors: bool) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Modified", "Size", "Type", "Name"]);

    for entry in &page.items {
        table.add_row(vec![
            modified(entry),
            entry.size_human().unwrap_or_default(),
            entry.mime_type.clone().unwrap_or_else(|| "-".to_string()),
            name(entry, colors),
        ]);
    }
    if let Some(column) = table.column_mut(1) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    table
}

fn modified(entry: &RemoteEntry) -> String {
    entry
        .modified
        .map(|ts| ts.strftime("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

fn name(entry: &RemoteEntry, colors: bool) -> String {
    match (entry.is_dir(), colors) {
        (true, true) => console::style(format!("{}/", entry.name)).blue().bold().to_string(),
        (true, false) => format!("{}/", entry.name),
        (false, _) => entry.name.clone(),
    }
}
