/// Convert PascalCase to lowerCamelCase.
///
/// A leading run of capitals is lowered as one word, keeping the capital
/// that starts the next word. All-caps input is lowered entirely.
///
/// # Examples
/// ```
/// use contractgen_core::utils::to_lower_camel_case;
/// assert_eq!(to_lower_camel_case("UserId"), "userId");
/// assert_eq!(to_lower_camel_case("ID"), "id");
/// assert_eq!(to_lower_camel_case("URLValue"), "urlValue");
/// ```
pub fn to_lower_camel_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len());
    let mut lowering = true;
    for (i, &c) in chars.iter().enumerate() {
        if lowering && c.is_uppercase() {
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if i > 0 && next_is_lower {
                lowering = false;
                result.push(c);
            } else {
                result.extend(c.to_lowercase());
            }
            continue;
        }
        lowering = false;
        result.push(c);
    }
    result
}

/// Default English pluralizer used to name enum lookup objects.
///
/// # Examples
/// ```
/// use contractgen_core::utils::pluralize;
/// assert_eq!(pluralize("Color"), "Colors");
/// assert_eq!(pluralize("Status"), "Statuses");
/// assert_eq!(pluralize("Category"), "Categories");
/// ```
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let lower = word.to_ascii_lowercase();
    if ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        return format!("{word}es");
    }

    if let Some(stem) = word.strip_suffix('y') {
        let before_y = stem.chars().last();
        if before_y.is_some_and(|c| !"aeiouAEIOU".contains(c)) {
            return format!("{stem}ies");
        }
    }

    format!("{word}s")
}
