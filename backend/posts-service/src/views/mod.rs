//! Server-rendered HTML pages.
//!
//! Every value interpolated into markup goes through [`escape_html`].

use crate::models::{FieldErrors, Post, PostId, PostPage};
use std::fmt::Write;

/// Escape text for use in element content and quoted attribute values
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body>
<main>
{content}
</main>
</body>
</html>
"#,
        title = escape_html(title),
        content = content,
    )
}

fn post_href(id: &PostId) -> String {
    format!("/posts/{}", escape_html(id.as_str()))
}

/// Post listing with an optional flash banner and previous/next links
pub fn index(page: &PostPage, flash: Option<&str>) -> String {
    let mut content = String::from("<h1>Posts</h1>\n");

    if let Some(message) = flash {
        let _ = writeln!(
            content,
            r#"<div class="flash" role="status">{}</div>"#,
            escape_html(message)
        );
    }

    content.push_str("<p><a href=\"/posts/create\">New post</a></p>\n");

    if page.items.is_empty() {
        content.push_str("<p class=\"empty\">No posts yet.</p>\n");
    } else {
        content.push_str("<table>\n<thead><tr><th>Title</th><th>Created</th><th></th></tr></thead>\n<tbody>\n");
        for post in &page.items {
            let href = post_href(&post.id);
            let _ = writeln!(
                content,
                r#"<tr><td><a href="{href}">{title}</a></td><td>{created}</td><td><a href="{href}/edit">Edit</a> {delete}</td></tr>"#,
                href = href,
                title = escape_html(&post.title),
                created = post.created_at.format("%Y-%m-%d %H:%M"),
                delete = delete_button(&post.id),
            );
        }
        content.push_str("</tbody>\n</table>\n");
    }

    if page.has_previous() || page.has_next() {
        content.push_str("<nav class=\"pagination\">");
        if page.has_previous() {
            let _ = write!(content, r#"<a rel="prev" href="/posts?page={}">Previous</a> "#, page.page - 1);
        }
        let _ = write!(content, "<span>Page {} of {}</span>", page.page, page.last_page());
        if page.has_next() {
            let _ = write!(content, r#" <a rel="next" href="/posts?page={}">Next</a>"#, page.page + 1);
        }
        content.push_str("</nav>\n");
    }

    layout("Posts", &content)
}

pub fn show(post: &Post) -> String {
    let href = post_href(&post.id);
    let content = format!(
        r#"<article>
<h1>{title}</h1>
<p class="meta">Created {created}, updated {updated}</p>
<div class="body">{body}</div>
</article>
<p><a href="{href}/edit">Edit</a> {delete} <a href="/posts">Back to posts</a></p>
"#,
        title = escape_html(&post.title),
        created = post.created_at.format("%Y-%m-%d %H:%M"),
        updated = post.updated_at.format("%Y-%m-%d %H:%M"),
        body = escape_html(&post.body),
        href = href,
        delete = delete_button(&post.id),
    );
    layout(&post.title, &content)
}

/// Empty or re-displayed creation form
pub fn create_form(title: &str, body: &str, errors: &FieldErrors) -> String {
    let content = format!(
        "<h1>New post</h1>\n{}",
        post_form("/posts", None, title, body, errors)
    );
    layout("New post", &content)
}

/// Edit form; submits as POST with `_method=PUT`
pub fn edit_form(id: &PostId, title: &str, body: &str, errors: &FieldErrors) -> String {
    let content = format!(
        "<h1>Edit post</h1>\n{}",
        post_form(&post_href(id), Some("PUT"), title, body, errors)
    );
    layout("Edit post", &content)
}

pub fn error_page(status: u16, heading: &str, message: &str) -> String {
    let content = format!(
        "<h1>{status} {heading}</h1>\n<p>{message}</p>\n<p><a href=\"/posts\">Back to posts</a></p>\n",
        status = status,
        heading = escape_html(heading),
        message = escape_html(message),
    );
    layout(heading, &content)
}

fn delete_button(id: &PostId) -> String {
    format!(
        r#"<form class="inline" method="post" action="{}"><input type="hidden" name="_method" value="DELETE"><button type="submit">Delete</button></form>"#,
        post_href(id)
    )
}

fn post_form(
    action: &str,
    method: Option<&str>,
    title: &str,
    body: &str,
    errors: &FieldErrors,
) -> String {
    let mut form = format!(r#"<form method="post" action="{}">"#, action);
    form.push('\n');
    if let Some(method) = method {
        let _ = writeln!(
            form,
            r#"<input type="hidden" name="_method" value="{}">"#,
            escape_html(method)
        );
    }

    let _ = writeln!(
        form,
        r#"<p><label for="title">Title</label><br><input id="title" name="title" type="text" maxlength="255" value="{}"></p>"#,
        escape_html(title)
    );
    field_error(&mut form, errors, "title");

    let _ = writeln!(
        form,
        r#"<p><label for="body">Body</label><br><textarea id="body" name="body" rows="8">{}</textarea></p>"#,
        escape_html(body)
    );
    field_error(&mut form, errors, "body");

    form.push_str("<p><button type=\"submit\">Save</button> <a href=\"/posts\">Cancel</a></p>\n</form>\n");
    form
}

fn field_error(out: &mut String, errors: &FieldErrors, field: &str) {
    if let Some(message) = errors.get(field) {
        let _ = writeln!(
            out,
            r#"<p class="error" id="{field}-error">{}</p>"#,
            escape_html(message)
        );
    }
}
