use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use shelfkeep_catalog::{CollectionItem, Record, RecordKind};
use shelfkeep_lib::display::format_price;
use shelfkeep_store::{filter_records, sort_records, RecordFilter, SortOrder};

use crate::{AppContext, CliError};

use super::{open_store, parse_assignment, truncate_str};

const NAME_WIDTH: usize = 32;

pub(crate) fn run_list(
    ctx: &AppContext,
    kind: RecordKind,
    sort: Option<String>,
    desc: bool,
    search: Option<String>,
    filters: Vec<String>,
    full: bool,
) -> Result<(), CliError> {
    let store = open_store(ctx)?;

    let mut filter = RecordFilter::default();
    if let Some(text) = search {
        filter = filter.search(text);
    }
    for arg in &filters {
        let (field, value) = parse_assignment(arg)?;
        filter = filter.field_equals(field, value);
    }

    let all = store.load(kind)?;
    let total = all.len();
    let mut records = filter_records(all, &filter);

    if let Some(field) = sort.as_deref() {
        let order = if desc { SortOrder::Descending } else { SortOrder::Ascending };
        sort_records(&mut records, field, order);
    }

    if records.is_empty() {
        if total == 0 {
            log::info!("No {} records yet.", kind);
            log::info!("Run 'shelfkeep import {} <FILE>' to add some.", kind);
        } else {
            log::info!("No {} records match ({} in total).", kind, total);
        }
        return Ok(());
    }

    log::info!(
        "{}",
        format!("{} ({} of {})", kind.storage_key(), records.len(), total).if_supports_color(Stdout, |t| t.bold()),
    );

    for record in &records {
        if full {
            print_full(record);
        } else {
            print_line(kind, record);
        }
    }

    Ok(())
}

fn print_line(kind: RecordKind, record: &Record) {
    let item = CollectionItem::from_record(kind, record);
    let price = item
        .price()
        .filter(|p| *p != 0.0)
        .map(format_price)
        .unwrap_or_else(|| "-".to_string());

    let detail = match &item {
        CollectionItem::Figure(f) => format!("{} / {}  rank {}", f.shelf, f.display, f.ranking),
        CollectionItem::Wishlist(w) => w.link.clone().unwrap_or_default(),
        CollectionItem::Custom(c) => c.notes.as_deref().map(|n| truncate_str(n, 40)).unwrap_or_default(),
    };

    log::info!(
        "  {:>5}  {:<width$}  {:>10}  {}",
        item.id().if_supports_color(Stdout, |t| t.dimmed()),
        truncate_str(item.name(), NAME_WIDTH),
        price,
        detail,
        width = NAME_WIDTH,
    );
}

fn print_full(record: &Record) {
    let title = record.id().unwrap_or_else(|| "(no id)".to_string());
    log::info!("  {}", title.if_supports_color(Stdout, |t| t.bold()));
    for (field, value) in record.iter().filter(|(field, _)| *field != "id") {
        log::info!("    {:<12} {}", field.if_supports_color(Stdout, |t| t.cyan()), value);
    }
}
