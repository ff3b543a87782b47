//! Russian plural forms for counted nouns

/// Format `n` with the noun form that agrees with it
///
/// `one` is the nominative singular ("пост"), `few` the form used after
/// 2-4 ("поста"), `many` the form used after 5-20 and zero ("постов").
///
/// ```
/// use kitoboy_common::plural::format_integer_with_caption;
///
/// assert_eq!(format_integer_with_caption(1, "пост", "поста", "постов"), "1 пост");
/// assert_eq!(format_integer_with_caption(22, "пост", "поста", "постов"), "22 поста");
/// assert_eq!(format_integer_with_caption(11, "пост", "поста", "постов"), "11 постов");
/// ```
pub fn format_integer_with_caption(n: u64, one: &str, few: &str, many: &str) -> String {
    let caption = if (5..20).contains(&(n % 100)) {
        many
    } else {
        match n % 10 {
            1 => one,
            2..=4 => few,
            _ => many,
        }
    };

    format!("{} {}", n, caption)
}
