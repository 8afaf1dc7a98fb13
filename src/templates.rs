use crate::billing::{Currency, LineItem, Money};

/// Replace every `%key%` occurrence in `template` with the value paired with
/// `key` in `vars`, in a single left-to-right scan. Substituted text is never
/// rescanned, and placeholders with no matching key pass through verbatim.
pub fn substitute(template: &str, vars: &[(String, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let matched = after.find('%').and_then(|end| {
            let key = &after[..end];
            vars.iter()
                .find(|(name, _)| name.as_str() == key)
                .map(|(_, value)| (value, &after[end + 1..]))
        });
        match matched {
            Some((value, remainder)) => {
                out.push_str(value);
                rest = remainder;
            }
            None => {
                // Lone or unmatched '%': keep it and rescan from the next
                // character so a later placeholder can still match.
                out.push('%');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Render the items table body: one `<tr>` per item with description,
/// quantity, formatted unit price and formatted line total, concatenated
/// without separators. Date placeholders inside descriptions (e.g.
/// `%past_month%`) are filled in before the row is built.
pub fn render_rows(
    items: &[LineItem],
    currency: Currency,
    date_vars: &[(String, String)],
) -> String {
    items
        .iter()
        .map(|item| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                substitute(&item.description, date_vars),
                item.quantity,
                Money::new(currency, item.unit_price),
                Money::new(currency, item.line_total()),
            )
        })
        .collect()
}
