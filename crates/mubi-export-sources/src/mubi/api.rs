use serde_json::Value;

const ITEM_KEYS: [&str; 3] = ["wishes", "ratings", "data"];

/// Items carried by one page, in service order.
///
/// List endpoints hold the items under a data-set specific key (`wishes`,
/// `ratings`) or `data`. Otherwise the first non-empty array in document
/// order is used, so an empty sibling such as `errors: []` never shadows
/// the real list.
pub fn extract_items(body: &Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items.clone(),
        Value::Object(map) => ITEM_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .or_else(|| find_first_array(body, true))
            .or_else(|| find_first_array(body, false))
            .cloned()
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn find_first_array(value: &Value, non_empty: bool) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) if !non_empty || !items.is_empty() => Some(items),
        Value::Array(_) => None,
        Value::Object(map) => map.values().find_map(|v| find_first_array(v, non_empty)),
        _ => None,
    }
}

/// Whether another page should be requested after `page`.
///
/// Reads `has_more`, then `meta.next_page` / `meta.total_pages`. Without any
/// of them paging continues until an empty page.
pub fn has_more(body: &Value, page: u32, items_on_page: usize) -> bool {
    if items_on_page == 0 {
        return false;
    }

    if let Some(flag) = body.get("has_more").and_then(Value::as_bool) {
        return flag;
    }

    if let Some(meta) = body.get("meta").and_then(Value::as_object) {
        if let Some(next) = meta.get("next_page") {
            return !next.is_null();
        }
        if let Some(total) = meta.get("total_pages").and_then(Value::as_u64) {
            return u64::from(page) < total;
        }
    }

    // No pagination metadata: keep going until an empty page
    true
}
