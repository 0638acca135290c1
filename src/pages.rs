// src/pages.rs
//! Minimal server-rendered pages.
//!
//! Rendering is string substitution into one shared layout; it is a thin
//! collaborator, not a template engine. All user-supplied values are
//! escaped before interpolation. Stored post bodies are already
//! sanitized, so they are embedded as-is.

use crate::common::escape_html;
use crate::posts::models::Post;

/// Wrap a page body in the shared HTML layout
pub fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{} - Castpress</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 760px; margin: 40px auto; padding: 0 20px; color: #333; line-height: 1.6; }}
        nav {{ margin-bottom: 30px; }}
        nav a {{ margin-right: 15px; color: #4F46E5; text-decoration: none; }}
        .error {{ background: #fee; border: 1px solid #fcc; padding: 12px; border-radius: 6px; }}
        .notice {{ background: #e8f5e9; border: 1px solid #c8e6c9; padding: 12px; border-radius: 6px; }}
        form label {{ display: block; margin-top: 12px; font-weight: bold; }}
        input, textarea, select {{ width: 100%; padding: 8px; margin-top: 4px; box-sizing: border-box; }}
        button {{ margin-top: 16px; padding: 10px 20px; background: #4F46E5; color: white; border: none; border-radius: 6px; cursor: pointer; }}
        .post-list li {{ margin-bottom: 8px; }}
    </style>
</head>
<body>
    <nav>
        <a href="/">Home</a>
        <a href="/dashboard">Dashboard</a>
        <a href="/logout">Log out</a>
    </nav>
    {}
</body>
</html>"#,
        escape_html(title),
        body
    )
}

pub fn home_page() -> String {
    layout(
        "Welcome",
        r#"<h1>Castpress</h1>
<p>Turn YouTube videos and transcripts into ready-to-publish blog posts.</p>
<p><a href="/signup">Sign up</a> or <a href="/login">log in</a> to get started.</p>"#,
    )
}

pub fn signup_page(error: Option<&str>) -> String {
    let banner = match error {
        Some(msg) => format!(r#"<p class="error">{}</p>"#, escape_html(msg)),
        None => String::new(),
    };
    layout(
        "Sign up",
        &format!(
            r#"<h1>Create an account</h1>
{}
<form method="post" action="/signup">
    <label>Name <input type="text" name="name" required></label>
    <label>Email <input type="email" name="email" required></label>
    <label>Password <input type="password" name="password" required minlength="8"></label>
    <button type="submit">Sign up</button>
</form>"#,
            banner
        ),
    )
}

pub fn login_page(message: Option<&str>) -> String {
    let banner = match message {
        Some(msg) => format!(r#"<p class="error">{}</p>"#, escape_html(msg)),
        None => String::new(),
    };
    layout(
        "Log in",
        &format!(
            r#"<h1>Log in</h1>
{}
<form method="post" action="/login">
    <label>Email <input type="email" name="email" required></label>
    <label>Password <input type="password" name="password" required></label>
    <button type="submit">Log in</button>
</form>"#,
            banner
        ),
    )
}

/// Generic status page used after signup and email verification
pub fn status_page(title: &str, message: &str) -> String {
    layout(
        title,
        &format!(
            r#"<h1>{}</h1>
<p class="notice">{}</p>"#,
            escape_html(title),
            escape_html(message)
        ),
    )
}

pub fn dashboard_page(user_name: &str, posts: &[Post]) -> String {
    let post_items = if posts.is_empty() {
        "<p>No posts yet. Generate your first one below.</p>".to_string()
    } else {
        let items: String = posts
            .iter()
            .map(|p| {
                format!(
                    r#"<li><a href="/posts/{}/edit">{}</a> <small>({})</small> &middot; <a href="/posts/{}/download">download</a></li>"#,
                    escape_html(&p.id),
                    escape_html(&p.title),
                    escape_html(p.created_at.as_deref().unwrap_or("")),
                    escape_html(&p.id),
                )
            })
            .collect();
        format!(r#"<ul class="post-list">{}</ul>"#, items)
    };

    layout(
        "Dashboard",
        &format!(
            r#"<h1>Your posts</h1>
<p>Signed in as {}.</p>
{}
<h2>Generate a new post</h2>
<p id="generate-status"></p>
<form id="generate-form">
    <label>YouTube URL <input type="url" name="youtube_url" placeholder="https://www.youtube.com/watch?v=..."></label>
    <label>Or paste a transcript <textarea name="transcript" rows="6"></textarea></label>
    <label>Model <input type="text" name="ai_model" placeholder="default"></label>
    <button type="submit">Generate</button>
</form>
<script>
document.getElementById('generate-form').addEventListener('submit', async (e) => {{
    e.preventDefault();
    const form = new FormData(e.target);
    const status = document.getElementById('generate-status');
    status.textContent = 'Generating...';
    const payload = {{}};
    for (const [k, v] of form.entries()) {{ if (v) payload[k] = v; }}
    const resp = await fetch('/generate', {{
        method: 'POST',
        headers: {{ 'Content-Type': 'application/json' }},
        body: JSON.stringify(payload),
    }});
    const data = await resp.json();
    if (resp.ok && data.success) {{
        window.location = '/posts/' + data.post_id + '/edit';
    }} else {{
        status.textContent = data.error || 'Generation failed';
    }}
}});
</script>"#,
            escape_html(user_name),
            post_items
        ),
    )
}

pub fn editor_page(post: &Post) -> String {
    layout(
        "Edit post",
        &format!(
            r#"<h1>Edit post</h1>
<p id="save-status"></p>
<form id="editor-form">
    <label>Title <input type="text" name="title" value="{title}"></label>
    <label>Meta description <textarea name="meta_description" rows="2">{meta}</textarea></label>
    <label>SEO keywords <input type="text" name="seo_keywords" value="{keywords}"></label>
    <label>Summary <textarea name="summary" rows="3">{summary}</textarea></label>
    <label>Content (HTML) <textarea name="content_html" rows="20">{content}</textarea></label>
    <button type="submit">Save</button>
</form>
<p><a href="/posts/{id}/download">Download HTML</a></p>
<script>
document.getElementById('editor-form').addEventListener('submit', async (e) => {{
    e.preventDefault();
    const form = new FormData(e.target);
    const status = document.getElementById('save-status');
    const resp = await fetch('/posts/{id}/save', {{
        method: 'POST',
        headers: {{ 'Content-Type': 'application/json' }},
        body: JSON.stringify(Object.fromEntries(form.entries())),
    }});
    const data = await resp.json();
    status.textContent = resp.ok && data.success ? 'Saved.' : (data.error || 'Save failed');
}});
</script>"#,
            title = escape_html(&post.title),
            meta = escape_html(&post.meta_description),
            keywords = escape_html(&post.seo_keywords),
            summary = escape_html(&post.summary),
            content = escape_html(&post.content_html),
            id = escape_html(&post.id),
        ),
    )
}

/// Standalone HTML document served by the download endpoint
pub fn download_document(post: &Post) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <meta name="description" content="{meta}">
    <meta name="keywords" content="{keywords}">
</head>
<body>
{content}
</body>
</html>"#,
        title = escape_html(&post.title),
        meta = escape_html(&post.meta_description),
        keywords = escape_html(&post.seo_keywords),
        content = post.content_html,
    )
}
