//! Minimal inline HTML. Most text is escaped; review comments and the review search term are not.

use crate::models::{Message, Order, OrderItem, Product, Review, User};
use crate::pagination::Page;
use crate::session::{Flash, Session};

pub const SITE_NAME: &str = "Vulnerable Shop";

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode a query-string value; spaces become `+`.
pub fn url_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

pub fn price(amount: f64) -> String {
    format!("¥{:.0}", amount)
}

pub fn layout(title: &str, session: &Session, flashes: &[Flash], body: &str) -> String {
    let account = match session.username() {
        Some(name) => {
            let admin = if session.is_admin() {
                r#" | <a href="/admin">Admin</a>"#
            } else {
                ""
            };
            format!(
                r#"<a href="/profile">{}</a> | <a href="/orders">Orders</a> | <a href="/mail">Mail</a> | <a href="/contact">Contact</a>{} | <a href="/logout">Logout</a>"#,
                escape(name),
                admin
            )
        }
        None => r#"<a href="/login">Login</a> | <a href="/register">Register</a>"#.to_string(),
    };
    let flashes: String = flashes
        .iter()
        .map(|f| format!(r#"<div class="flash {}">{}</div>"#, f.kind.as_str(), escape(&f.message)))
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{title} - {site}</title></head>
<body>
<header><a href="/">{site}</a> | <a href="/products">Products</a> | <a href="/categories">Categories</a> | <a href="/search">Search</a> | <a href="/cart">Cart ({cart})</a> | {account}</header>
<p class="warning">This site is intentionally vulnerable. Use it for training only.</p>
{flashes}
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
        site = SITE_NAME,
        cart = session.cart.iter().fold(0i64, |n, l| n.saturating_add(l.quantity)),
        account = account,
        flashes = flashes,
        body = body
    )
}

pub fn product_card(p: &Product) -> String {
    format!(
        r#"<div class="product"><a href="/product/{id}">{name}</a> <span class="price">{price}</span> <span class="category">{category}</span></div>"#,
        id = p.id,
        name = escape(&p.name),
        price = price(p.price),
        category = escape(p.category.as_deref().unwrap_or(""))
    )
}

pub fn product_list(products: &[Product]) -> String {
    if products.is_empty() {
        return "<p>No products found.</p>".into();
    }
    products.iter().map(product_card).collect()
}

/// The comment is inserted verbatim.
pub fn review_item(r: &Review) -> String {
    let product = r
        .product_name
        .as_deref()
        .map(|n| format!(r#" on <a href="/product/{}">{}</a>"#, r.product_id, escape(n)))
        .unwrap_or_default();
    format!(
        r#"<div class="review"><strong>{user}</strong>{product} rated {rating}/5<div class="comment">{comment}</div></div>"#,
        user = escape(r.username.as_deref().unwrap_or("anonymous")),
        product = product,
        rating = r.rating,
        comment = r.comment
    )
}

pub fn pagination_links<T>(page: &Page<T>, path: &str, query: &[(&str, &str)]) -> String {
    let mut base: String = query
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{}={}&", k, url_encode(v)))
        .collect();
    base.insert(0, '?');
    let prev = if page.current_page > 1 {
        format!(r#"<a href="{}{}page={}">Previous</a> "#, path, base, page.current_page - 1)
    } else {
        String::new()
    };
    let next = if page.current_page < page.total_pages {
        format!(r#" <a href="{}{}page={}">Next</a>"#, path, base, page.current_page + 1)
    } else {
        String::new()
    };
    format!(
        r#"<nav class="pages">{}Page {} of {}{}</nav>"#,
        prev, page.current_page, page.total_pages, next
    )
}

/// The search term is echoed unescaped.
pub fn home(featured: &[Product], reviews: &[Review], review_query: &str) -> String {
    let results_for = if review_query.is_empty() {
        String::new()
    } else {
        format!("<p>Reviews matching: {}</p>", review_query)
    };
    let reviews: String = if reviews.is_empty() {
        "<p>No reviews yet.</p>".into()
    } else {
        reviews.iter().map(review_item).collect()
    };
    format!(
        r#"<h2>Featured products</h2>
{featured}
<h2>Recent reviews</h2>
<form action="/" method="get"><input name="review_search" value=""><button>Search reviews</button></form>
{results_for}
{reviews}"#,
        featured = product_list(featured),
        results_for = results_for,
        reviews = reviews
    )
}

pub fn products_page(page: &Page<Product>, category: &str) -> String {
    let heading = if category.is_empty() {
        String::new()
    } else {
        format!("<p>Category: {}</p>", escape(category))
    };
    format!(
        "{}<p>{} products</p>{}{}",
        heading,
        page.total_items,
        product_list(&page.items),
        pagination_links(page, "/products", &[("category", category)])
    )
}

pub fn search_form(query: &str) -> String {
    format!(
        r#"<form action="/search" method="get"><input name="q" value="{}"><button>Search</button></form>"#,
        escape(query)
    )
}

pub fn search_page(page: &Page<Product>, query: &str) -> String {
    format!(
        "{}<p>{} results for \"{}\"</p>{}{}",
        search_form(query),
        page.total_items,
        escape(query),
        product_list(&page.items),
        pagination_links(page, "/search", &[("q", query)])
    )
}

pub fn product_detail(product: &Product, reviews: &[Review], logged_in: bool) -> String {
    let review_form = if logged_in {
        format!(
            r#"<form action="/product/{}/review" method="post">
<select name="rating"><option>5</option><option>4</option><option>3</option><option>2</option><option>1</option></select>
<textarea name="comment"></textarea><button>Post review</button></form>"#,
            product.id
        )
    } else {
        r#"<p><a href="/login">Log in</a> to post a review.</p>"#.into()
    };
    let reviews: String = if reviews.is_empty() {
        "<p>No reviews yet.</p>".into()
    } else {
        reviews.iter().map(review_item).collect()
    };
    format!(
        r#"<p class="price">{price}</p>
<p>{description}</p>
<p>Category: {category} | In stock: {stock}</p>
<form action="/cart/add" method="post"><input type="hidden" name="product_id" value="{id}"><input name="quantity" value="1"><button>Add to cart</button></form>
<h2>Reviews</h2>
{review_form}
{reviews}"#,
        price = price(product.price),
        description = escape(product.description.as_deref().unwrap_or("")),
        category = escape(product.category.as_deref().unwrap_or("")),
        stock = product.stock,
        id = product.id,
        review_form = review_form,
        reviews = reviews
    )
}

pub fn categories(counts: &[(String, i64)]) -> String {
    if counts.is_empty() {
        return "<p>No categories.</p>".into();
    }
    let items: String = counts
        .iter()
        .map(|(name, count)| {
            format!(
                r#"<li><a href="/products?category={0}">{1}</a> ({2})</li>"#,
                url_encode(name),
                escape(name),
                count
            )
        })
        .collect();
    format!("<ul>{}</ul>", items)
}

pub fn login_form() -> String {
    r#"<form action="/login" method="post">
<input name="username" placeholder="username">
<input name="password" type="password" placeholder="password">
<input type="hidden" name="role" value="user">
<button>Login</button></form>"#
        .into()
}

pub fn register_form() -> String {
    r#"<form action="/register" method="post">
<input name="username" placeholder="username">
<input name="password" type="password" placeholder="password">
<input name="email" placeholder="email">
<input name="address" placeholder="address">
<input name="phone" placeholder="phone">
<input type="hidden" name="is_admin" value="0">
<button>Register</button></form>"#
        .into()
}

pub fn profile(user: &User) -> String {
    format!(
        r#"<dl><dt>Username</dt><dd>{}</dd><dt>Email</dt><dd>{}</dd><dt>Address</dt><dd>{}</dd><dt>Phone</dt><dd>{}</dd><dt>Admin</dt><dd>{}</dd><dt>Joined</dt><dd>{}</dd></dl>"#,
        escape(&user.username),
        escape(user.email.as_deref().unwrap_or("")),
        escape(user.address.as_deref().unwrap_or("")),
        escape(user.phone.as_deref().unwrap_or("")),
        user.is_admin,
        escape(user.created_at.as_deref().unwrap_or(""))
    )
}

pub fn public_profile(user: &User) -> String {
    format!(
        r#"<dl><dt>Username</dt><dd>{}</dd><dt>Email</dt><dd>{}</dd><dt>Joined</dt><dd>{}</dd></dl>"#,
        escape(&user.username),
        escape(user.email.as_deref().unwrap_or("")),
        escape(user.created_at.as_deref().unwrap_or(""))
    )
}

pub fn contact_form() -> String {
    r#"<form action="/contact" method="post">
<input name="title" placeholder="subject">
<input name="email" placeholder="your email (comma-separate to add BCC)">
<textarea name="content"></textarea>
<button>Send</button></form>"#
        .into()
}

pub fn inbox(messages: &[Message]) -> String {
    if messages.is_empty() {
        return "<p>No messages.</p>".into();
    }
    let rows: String = messages
        .iter()
        .map(|m| {
            format!(
                r#"<li>{unread}<a href="/mail/{id}">{subject}</a> from {sender} {at}</li>"#,
                unread = if m.is_read { "" } else { "[new] " },
                id = m.id,
                subject = escape(m.subject.as_deref().unwrap_or("(no subject)")),
                sender = escape(m.sender_name.as_deref().unwrap_or("unknown")),
                at = escape(m.created_at.as_deref().unwrap_or(""))
            )
        })
        .collect();
    format!("<ul>{}</ul>", rows)
}

pub fn message(m: &Message) -> String {
    format!(
        "<p>From: {}</p><pre>{}</pre>",
        escape(m.sender_name.as_deref().unwrap_or("unknown")),
        escape(&m.content)
    )
}

/// One cart line with current product data.
pub struct CartRow<'a> {
    pub product: &'a Product,
    pub quantity: i64,
}

pub fn cart(rows: &[CartRow<'_>], total: f64) -> String {
    if rows.is_empty() {
        return r#"<p>Your cart is empty. <a href="/products">Browse products</a></p>"#.into();
    }
    let lines: String = rows
        .iter()
        .map(|r| {
            format!(
                r#"<tr><td><a href="/product/{id}">{name}</a></td><td>{unit}</td>
<td><form action="/cart/update" method="post"><input type="hidden" name="product_id" value="{id}"><input name="quantity" value="{qty}"><button>Update</button></form></td>
<td>{line}</td><td><form action="/cart/remove/{id}" method="post"><button>Remove</button></form></td></tr>"#,
                id = r.product.id,
                name = escape(&r.product.name),
                unit = price(r.product.price),
                qty = r.quantity,
                line = price(r.product.price * r.quantity as f64)
            )
        })
        .collect();
    format!(
        r#"<table>{}</table><p>Total: {}</p>
<form action="/checkout" method="post"><input name="shipping_address" placeholder="shipping address"><button>Checkout</button></form>"#,
        lines,
        price(total)
    )
}

pub fn orders(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "<p>No orders yet.</p>".into();
    }
    let rows: String = orders
        .iter()
        .map(|o| {
            format!(
                r#"<li><a href="/orders/{0}">Order #{0}</a> {1} {2} {3}</li>"#,
                o.id,
                price(o.total),
                escape(&o.status),
                escape(o.created_at.as_deref().unwrap_or(""))
            )
        })
        .collect();
    format!("<ul>{}</ul>", rows)
}

pub fn order_detail(order: &Order, items: &[OrderItem]) -> String {
    let rows: String = items
        .iter()
        .map(|i| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(i.product_name.as_deref().unwrap_or("(removed product)")),
                price(i.price),
                i.quantity,
                price(i.line_total())
            )
        })
        .collect();
    format!(
        "<p>Status: {}</p><p>Ship to: {}</p><table>{}</table><p>Total: {}</p>",
        escape(&order.status),
        escape(order.shipping_address.as_deref().unwrap_or("")),
        rows,
        price(order.total)
    )
}

pub fn admin_dashboard(users: &[User], products: &[Product], message_count: i64) -> String {
    let users: String = users
        .iter()
        .map(|u| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                u.id,
                escape(&u.username),
                escape(&u.password),
                escape(u.email.as_deref().unwrap_or("")),
                u.is_admin
            )
        })
        .collect();
    let products: String = products
        .iter()
        .map(|p| {
            format!(
                r#"<tr><td>{id}</td><td>{name}</td><td>{price}</td><td>{stock}</td><td><form action="/admin/products/{id}/delete" method="post"><button>Delete</button></form></td></tr>"#,
                id = p.id,
                name = escape(&p.name),
                price = price(p.price),
                stock = p.stock
            )
        })
        .collect();
    format!(
        r#"<p>Messages stored: {message_count}</p>
<h2>Users</h2><table><tr><th>id</th><th>username</th><th>password</th><th>email</th><th>admin</th></tr>{users}</table>
<h2>Products</h2><table>{products}</table>
<h2>Add product</h2>
<form action="/admin/products" method="post">
<input name="name" placeholder="name"><input name="price" placeholder="price"><input name="stock" placeholder="stock">
<input name="category" placeholder="category"><input name="image_url" placeholder="image url">
<textarea name="description"></textarea><button>Create</button></form>"#,
        message_count = message_count,
        users = users,
        products = products
    )
}

pub fn about() -> String {
    r#"<p>This shop is a practice target for web-security training. It contains deliberate flaws, including SQL injection, stored and reflected XSS, and privilege escalation through client-controlled fields.</p>
<p>Never deploy it where real users or real data are involved.</p>"#
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(comment: &str) -> Review {
        Review {
            id: 1,
            product_id: 2,
            user_id: 3,
            rating: 5,
            comment: comment.into(),
            created_at: None,
            username: Some("<b>eve</b>".into()),
            product_name: None,
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;");
    }

    #[test]
    fn review_comment_is_raw_but_username_is_escaped() {
        let html = review_item(&review("<script>alert(1)</script>"));
        assert!(html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;b&gt;eve&lt;/b&gt;"));
    }

    #[test]
    fn pagination_links_carry_filters() {
        let page = crate::pagination::paginate((0..20).collect::<Vec<_>>(), 2, 9);
        let html = pagination_links(&page, "/products", &[("category", "fashion")]);
        assert!(html.contains(r#"href="/products?category=fashion&page=1""#));
        assert!(html.contains(r#"href="/products?category=fashion&page=3""#));
        assert!(html.contains("Page 2 of 3"));
    }

    #[test]
    fn pagination_links_percent_encode_values() {
        let page = crate::pagination::paginate((0..20).collect::<Vec<_>>(), 1, 9);
        let html = pagination_links(&page, "/products", &[("category", "home & garden #1")]);
        assert!(html.contains(r#"href="/products?category=home+%26+garden+%231&page=2""#));
        assert_eq!(url_encode("<\"é\">"), "%3C%22%C3%A9%22%3E");
    }
}
