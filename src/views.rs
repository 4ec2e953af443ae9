//! Server-rendered pages.
//!
//! Markup is deliberately plain; every interpolated value passes through
//! [`escape_html`].

use crate::models::{dashboard::DashboardCounts, session::SessionUser, user::Role};

const STYLE: &str = r#"
body{font-family:Inter,system-ui,sans-serif;background:#f4f6fb;margin:0;color:#1f2937}
.container{max-width:960px;margin:0 auto;padding:24px}
.header{background:#1e3a8a;color:#fff}.header a{color:#fff;margin-right:16px;text-decoration:none}
.header-content{display:flex;justify-content:space-between;align-items:center}
.card{background:#fff;border-radius:10px;padding:24px;box-shadow:0 1px 3px rgba(0,0,0,.08);margin-bottom:16px}
.card-container{display:grid;grid-template-columns:repeat(auto-fit,minmax(220px,1fr));gap:16px}
.login-card{max-width:400px;margin:80px auto}
.form-group{margin-bottom:14px}.form-group label{display:block;margin-bottom:4px;font-weight:500}
.form-group input{width:100%;padding:10px;border:1px solid #d1d5db;border-radius:6px;box-sizing:border-box}
.btn{background:#2563eb;color:#fff;border:0;padding:10px 16px;border-radius:6px;cursor:pointer}
.btn-full{width:100%}.btn-link{background:none;color:#fff;padding:0}
.alert-error{background:#fee2e2;color:#991b1b;padding:10px;border-radius:6px;margin-bottom:14px}
.stat-number{font-size:2rem;font-weight:700;margin:8px 0}
.demo-credentials{font-size:.85rem;color:#6b7280;margin-top:18px}
"#;

/// Escapes text for use in element content and quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

fn layout(title: &str, header: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en"><head>
<meta charset="UTF-8"><meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title} - Secure CRM System</title>
<link rel="stylesheet" href="/css/main.css">
<style>{STYLE}</style>
</head><body>
{header}
{body}
</body></html>"#,
        title = escape_html(title),
    )
}

fn nav(user: &SessionUser, csrf_token: &str) -> String {
    let links: &[(&str, &str)] = match user.role() {
        Role::Administrator => &[("/admin/dashboard", "Dashboard")],
        Role::Customer => &[("/customer/dashboard", "Dashboard")],
    };
    let links = links
        .iter()
        .map(|(href, label)| format!(r#"<a href="{href}" class="nav-link">{label}</a>"#))
        .collect::<String>();

    format!(
        r#"<header class="header"><div class="container header-content">
  <div class="logo"><h1>Secure CRM</h1></div>
  <nav class="nav">{links}
    <form method="POST" action="/auth/logout" style="display:inline">
      <input type="hidden" name="csrf_token" value="{csrf}">
      <button type="submit" class="btn btn-link">Logout ({name})</button>
    </form>
  </nav>
</div></header>"#,
        csrf = escape_html(csrf_token),
        name = escape_html(&user.display_name),
    )
}

/// The sign-in form.
///
/// `email` is echoed back after a failed attempt; the password never is.
pub fn login_page(error: Option<&str>, email: &str, show_demo_credentials: bool) -> String {
    let error_html = error
        .map(|e| format!(r#"<div class="alert alert-error">{}</div>"#, escape_html(e)))
        .unwrap_or_default();

    let demo_html = if show_demo_credentials {
        r#"<div class="demo-credentials">
      <h4>Demo Credentials:</h4>
      <p><strong>Admin:</strong> admin@securecrm.com / admin123</p>
      <p><strong>Customer:</strong> john@example.com / customer123</p>
    </div>"#
    } else {
        ""
    };

    let body = format!(
        r#"<div class="card login-card">
  <div class="login-header"><h1>Secure CRM System</h1><p>Please sign in to your account</p></div>
  {error_html}
  <form action="/auth/login" method="POST" class="login-form">
    <div class="form-group">
      <label for="email">Email Address</label>
      <input type="email" id="email" name="email" required value="{email}" placeholder="Enter your email">
    </div>
    <div class="form-group">
      <label for="password">Password</label>
      <input type="password" id="password" name="password" required placeholder="Enter your password">
    </div>
    <button type="submit" class="btn btn-primary btn-full">Sign In</button>
  </form>
  {demo_html}
</div>"#,
        email = escape_html(email),
    );

    layout("Login", "", &body)
}

pub fn admin_dashboard(user: &SessionUser, counts: &DashboardCounts, csrf_token: &str) -> String {
    let body = format!(
        r#"<main class="dashboard"><div class="container">
  <div class="dashboard-header"><h1>Admin Dashboard</h1><p>Welcome, {name}</p></div>
  <div class="card-container">
    <div class="card"><h3>Total Users</h3><p class="stat-number">{users}</p><p>Registered users</p></div>
    <div class="card"><h3>Total Customers</h3><p class="stat-number">{customers}</p><p>Customer records</p></div>
    <div class="card"><h3>Total Orders</h3><p class="stat-number">{orders}</p><p>Orders placed</p></div>
  </div>
</div></main>"#,
        name = escape_html(&user.display_name),
        users = counts.users,
        customers = counts.customers,
        orders = counts.orders,
    );

    layout("Admin Dashboard", &nav(user, csrf_token), &body)
}

pub fn customer_dashboard(user: &SessionUser, csrf_token: &str) -> String {
    let body = format!(
        r#"<main class="dashboard"><div class="container">
  <div class="dashboard-header"><h1>Customer Dashboard</h1><p>Welcome, {name}</p></div>
  <div class="card-container">
    <div class="card"><h3>My Profile</h3><p>Signed in as {email}</p></div>
    <div class="card"><h3>My Orders</h3><p>View your order history</p></div>
    <div class="card"><h3>Service Request</h3><p>Submit new service requests</p></div>
  </div>
</div></main>"#,
        name = escape_html(&user.display_name),
        email = escape_html(&user.email),
    );

    layout("Customer Dashboard", &nav(user, csrf_token), &body)
}

pub fn not_found_page() -> String {
    layout(
        "Not Found",
        "",
        r#"<div class="container"><div class="card"><h1>Page not found</h1><p><a href="/">Back to your dashboard</a></p></div></div>"#,
    )
}

/// Generic failure page. `message` must already be safe to show users.
pub fn error_page(message: &str) -> String {
    let body = format!(
        r#"<div class="container"><div class="card"><h1>Something went wrong</h1><p>{}</p><p><a href="/auth/login">Return to sign in</a></p></div></div>"#,
        escape_html(message)
    );
    layout("Error", "", &body)
}
