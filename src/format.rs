//! Format item listings, item details and session info as text.

use crate::keys::KeyPair;
use crate::store::Item;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn status_label(item: &Item) -> &'static str {
    if item.is_folder() {
        "folder"
    } else if item.is_retrieved {
        "retrieved"
    } else {
        "uploaded"
    }
}

/// First seven characters of a transaction id, enough to tell rows apart.
fn short_id(id: &str) -> String {
    id.chars().take(7).collect()
}

/// Format a projected listing as a table.
pub fn format_item_list_text(items: &[Item], total: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("My Drive")));
    if items.is_empty() {
        if total == 0 {
            out.push_str("No items yet. Upload a file or retrieve a transaction.\n");
        } else {
            out.push_str(&format!("No items match ({} hidden).\n", total));
        }
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Name", "Type", "Date", "Owner", "Transaction", "Status"]);
    for item in items {
        let mine = if item.owned_locally() { " (you)" } else { "" };
        table.add_row(vec![
            item.name.clone(),
            item.media_type(),
            item.date.clone(),
            format!("{}{}", item.owner, mine),
            short_id(item.transaction_id.as_str()),
            status_label(item).to_string(),
        ]);
    }
    out.push_str(&format!("{}\n\n", table));
    out.push_str(&format!("Showing {} of {} items.\n", items.len(), total));
    out
}

/// Format one item with every field, plus content size and digest when retrieved.
pub fn format_item_detail_text(item: &Item) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading(&item.name)));
    out.push_str(&format!("  Type: {}\n", item.media_type()));
    out.push_str(&format!("  Date: {}\n", item.date));
    out.push_str(&format!("  Owner: {}\n", item.owner));
    out.push_str(&format!("  Transaction: {}\n", item.transaction_id));
    out.push_str(&format!("  Owner public key: {}\n", item.owner_public_key));
    out.push_str(&format!(
        "  Uploaded here: {}\n",
        if item.owned_locally() { "yes" } else { "no" }
    ));
    out.push_str(&format!("  Status: {}\n", status_label(item)));
    if let Some(ref blob) = item.content {
        out.push_str(&format!("  Content: {} bytes ({})\n", blob.len(), blob.media_type));
        out.push_str(&format!("  BLAKE3: {}\n", blob.digest_hex()));
    }
    out
}

/// Format the session key pair. The private key is shown truncated.
pub fn format_keys_text(owner_name: &str, keys: &KeyPair) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Session")));
    out.push_str(&format!("  Owner: {}\n", owner_name));
    out.push_str(&format!("  Public key: {}\n", keys.public_key));
    let preview: String = keys.private_key.chars().take(8).collect();
    out.push_str(&format!("  Private key: {}...\n", preview));
    out
}
