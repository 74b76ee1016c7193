//! List, show and delete commands.

use super::{find_document, find_record, open_store};
use crate::cli::{DeleteArgs, ListArgs, ShowArgs};
use crate::config::Config;
use crate::error::Result;
use crate::output::{FieldView, Formatter};
use citeline_domain::traits::{RecordQuery, RecordRepository, ViewedRecordLog};
use citeline_review::{highlights_for_page, provenance, target_page, PageNavigator, ViewState};

/// Execute the list command.
pub async fn execute_list(args: ListArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let store = open_store(config)?;

    let records = match &args.document {
        Some(document) => {
            let doc = find_document(&store, document)?;
            store.list_records_where(&RecordQuery::for_document(doc.id))?
        }
        None => store.list_records()?,
    };

    let mut view = ViewState::default();
    if let Some(query) = &args.search {
        view.set_query(query.as_str());
    }
    let visible = view.visible(&records);
    let viewed = store.viewed_record_ids()?;

    println!("{}", formatter.format_records(&visible, &viewed)?);
    Ok(())
}

/// Execute the show command.
pub async fn execute_show(args: ShowArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let mut store = open_store(config)?;
    let target = find_record(&store, &args.record)?;
    let records = store.list_records()?;

    let mut view = ViewState::default();
    if let Some(query) = &args.search {
        view.set_query(query.as_str());
    }
    view.select(target.id);
    if let Some(key) = args.field {
        view.select_field(key);
    }

    let Some(record) = view.selected(&records) else {
        println!(
            "{}",
            formatter.warning("No record selected: the record is hidden by the current search")
        );
        return Ok(());
    };

    let key = view.selected_field;
    let page = match args.pages {
        Some(total) => PageNavigator::open_for(total, record, key).current(),
        None => target_page(record, Some(key)).unwrap_or(1),
    };

    let field_view = FieldView {
        record,
        key,
        provenance: provenance(key, record.field(key)),
        page,
        highlights: highlights_for_page(record, Some(key), page),
        position: view.position(&records),
    };
    println!("{}", formatter.format_field_view(&field_view)?);

    store.mark_viewed(record.id)?;
    Ok(())
}

/// Execute the delete command.
pub async fn execute_delete(args: DeleteArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let mut store = open_store(config)?;
    let record = find_record(&store, &args.record)?;

    store.delete_record(record.id)?;
    println!(
        "{}",
        formatter.success(&format!("Deleted record {} ({})", record.id.short(), record.item_name.value))
    );
    Ok(())
}
