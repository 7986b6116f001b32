//! Placeholder rewriting between backends. Templates are written with `?` (or `%s`).

use super::BackendKind;

/// Rewrite placeholders for `kind`. Postgres gets `$1..$n`; SQLite gets `?`.
/// Placeholders inside single-quoted literals are left alone.
pub fn translate_placeholders(sql: &str, kind: BackendKind) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut n = 0u32;
    let mut in_literal = false;
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            in_literal = !in_literal;
            out.push(c);
            continue;
        }
        if in_literal {
            out.push(c);
            continue;
        }
        let is_placeholder = match c {
            '?' => true,
            '%' if chars.peek() == Some(&'s') => {
                chars.next();
                true
            }
            _ => false,
        };
        if !is_placeholder {
            out.push(c);
            continue;
        }
        if kind.is_sqlite() {
            out.push('?');
        } else {
            n += 1;
            out.push('$');
            out.push_str(&n.to_string());
        }
    }
    out
}

/// True when the statement is an INSERT (leading whitespace ignored).
pub fn is_insert(sql: &str) -> bool {
    sql.trim_start()
        .get(..6)
        .map(|p| p.eq_ignore_ascii_case("insert"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_placeholders_for_postgres() {
        let sql = "SELECT * FROM products WHERE name LIKE ? OR description LIKE ?";
        assert_eq!(
            translate_placeholders(sql, BackendKind::Postgres),
            "SELECT * FROM products WHERE name LIKE $1 OR description LIKE $2"
        );
    }

    #[test]
    fn skips_question_marks_inside_literals() {
        let sql = "SELECT * FROM users WHERE bio = 'who? me?' AND id = ?";
        assert_eq!(
            translate_placeholders(sql, BackendKind::Postgres),
            "SELECT * FROM users WHERE bio = 'who? me?' AND id = $1"
        );
    }

    #[test]
    fn percent_s_becomes_question_mark_on_sqlite() {
        let sql = "INSERT INTO users (username, password) VALUES (%s, %s)";
        assert_eq!(
            translate_placeholders(sql, BackendKind::SqliteFile),
            "INSERT INTO users (username, password) VALUES (?, ?)"
        );
        assert_eq!(
            translate_placeholders(sql, BackendKind::Postgres),
            "INSERT INTO users (username, password) VALUES ($1, $2)"
        );
    }

    #[test]
    fn escaped_quotes_keep_literal_state() {
        let sql = "SELECT 'it''s ?' AS label, id FROM products WHERE id = ?";
        assert_eq!(
            translate_placeholders(sql, BackendKind::Postgres),
            "SELECT 'it''s ?' AS label, id FROM products WHERE id = $1"
        );
    }

    #[test]
    fn detects_insert_statements() {
        assert!(is_insert("  insert into reviews (comment) values (?)"));
        assert!(is_insert("INSERT INTO users DEFAULT VALUES"));
        assert!(!is_insert("UPDATE products SET stock = 0"));
        assert!(!is_insert("ins"));
    }
}
