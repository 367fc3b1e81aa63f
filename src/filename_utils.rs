use chrono::{DateTime, Local};

/// Characters that may not appear in a backup folder name.
const FORBIDDEN_CHARACTERS: &[char] = &['.', ',', '!', '\\', '/', ':', '?', '*', '"', '<', '>', '|'];

/// Formats a timestamp the way suggested backup names start, e.g. `20240101-093000`.
pub fn date_time_str(now: DateTime<Local>) -> String {
    now.format("%Y%m%d-%H%M%S").to_string()
}

/// Builds the default name for a new backup slot.
///
/// The user's display name is appended with accents folded and non-ASCII
/// characters dropped. It is left out when it contains characters that
/// cannot be used in a folder name.
pub fn suggested_slot_name(now: DateTime<Local>, user_name: &str) -> String {
    let user_part = if contains_invalid_char(user_name) {
        String::new()
    } else {
        remove_not_ascii(&remove_accents(user_name))
    };
    format!("{} {}", date_time_str(now), user_part)
        .trim_end()
        .to_string()
}

/// True when the name holds a forbidden or control character.
pub fn contains_invalid_char(name: &str) -> bool {
    name.chars()
        .any(|c| c.is_control() || FORBIDDEN_CHARACTERS.contains(&c))
}

/// Replaces forbidden characters with spaces and drops trailing spaces.
pub fn remove_forbidden_characters(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if FORBIDDEN_CHARACTERS.contains(&c) || c.is_control() {
                ' '
            } else {
                c
            }
        })
        .collect();
    replaced.trim_end_matches(' ').to_string()
}

/// Drops every non-ASCII character.
pub fn remove_not_ascii(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii()).collect()
}

/// Folds common Latin accented letters to their base letter.
pub fn remove_accents(name: &str) -> String {
    name.chars().map(fold_accent).collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'Ç' => 'C',
        'ç' => 'c',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'Ñ' => 'N',
        'ñ' => 'n',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => 'O',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'Ý' => 'Y',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

/// Folder name for a title's backups: hex id followed by the cleaned-up title name.
pub fn title_folder_name(title_id: u64, title_name: &str) -> String {
    let name = remove_forbidden_characters(&remove_not_ascii(&remove_accents(title_name)));
    let name = name.trim();
    if name.is_empty() {
        format!("{:016X}", title_id)
    } else {
        format!("{:016X} {}", title_id, name)
    }
}
