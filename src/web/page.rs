use crate::engine::query::QueryKind;
use crate::engine::QueryEngine;

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="zh-Hant">
<head>
<meta charset="utf-8">
<title>財務數據聊天機器人</title>
</head>
<body>
<h1>🤖 財務數據聊天機器人</h1>
<form id="query-form">
  <label>查詢類型 <select name="query_type">{{queries}}</select></label>
  <label>公司 <select name="company"><option value=""></option>{{companies}}</select></label>
  <label>年份 <select name="year"><option value=""></option>{{years}}</select></label>
  <button type="submit">查詢</button>
</form>
<pre id="response"></pre>
<script>
document.getElementById("query-form").addEventListener("submit", async (event) => {
  event.preventDefault();
  const form = new FormData(event.target);
  const reply = await fetch("/query", {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify(Object.fromEntries(form)),
  });
  document.getElementById("response").textContent = (await reply.json()).response;
});
</script>
</body>
</html>
"#;

fn option(value: &str, label: &str) -> String {
    format!(
        r#"<option value="{}">{}</option>"#,
        html_escape::encode_double_quoted_attribute(value),
        html_escape::encode_text(label)
    )
}

pub fn render_index(engine: &QueryEngine) -> String {
    let queries: String = QueryKind::ALL
        .iter()
        .map(|k| option(k.tag(), k.description()))
        .collect();
    let companies: String = engine
        .available_companies()
        .iter()
        .map(|c| option(c, c))
        .collect();
    let years: String = engine
        .available_years()
        .iter()
        .map(|y| option(&y.to_string(), &y.to_string()))
        .collect();

    TEMPLATE
        .replace("{{queries}}", &queries)
        .replace("{{companies}}", &companies)
        .replace("{{years}}", &years)
}
