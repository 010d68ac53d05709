//! Static status pages
//!
//! Renders the master dashboard and the volumes status page from the
//! document store. Pages are plain HTML regenerated on demand; the task
//! buttons call the dispatcher's `/run` endpoint on the same origin.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};

use crate::heartbeat::HEARTBEAT_SECTION;
use crate::store::DocumentId;
use crate::tasks::{TaskContext, TaskError, TaskId, TaskReport};

pub const DASHBOARD_PAGE: &str = "dashboard.html";
pub const VOLUMES_PAGE: &str = "volumes_status.html";

const STYLE: &str = "body{font-family:Segoe UI,Roboto,Arial;margin:24px} \
table{border-collapse:collapse;width:100%} th,td{border:1px solid #ccc;padding:8px 10px;text-align:left} \
th{background:#f5f7fb} .ok{color:#2e7d32}.bad{color:#c62828}.muted{color:#667} \
.nav a{margin-right:12px} .card{border:1px solid #ccc;border-radius:10px;padding:16px;margin-bottom:12px} \
.btn{display:inline-block;margin:4px 6px;padding:6px 10px;border:1px solid #ccc;border-radius:6px;background:#f7f9fc;cursor:pointer}";

const RUN_SCRIPT: &str = r#"<script>
async function runTask(task){
  const s = document.getElementById("runStatus");
  s.textContent = `Running ${task}...`;
  try{
    const res = await fetch(`/run?task=${task}`);
    const j = await res.json();
    s.textContent = `${task}: ${j.ok ? 'OK' : 'FAILED'} (code ${j.returncode ?? 'n/a'})`;
  }catch(e){ s.textContent = `${task}: error ${e}`; }
}
</script>"#;

/// The `regen_dashboards` task: rewrite both pages from current store state.
pub fn regenerate(ctx: &TaskContext) -> Result<TaskReport, TaskError> {
    let dashboard = write_page(ctx.config.root_dir(), DASHBOARD_PAGE, &master_page(ctx))?;
    let volumes = write_page(ctx.config.root_dir(), VOLUMES_PAGE, &volumes_page(ctx))?;
    Ok(TaskReport {
        ok: true,
        body: json!({
            "ok": true,
            "generated": [dashboard.display().to_string(), volumes.display().to_string()],
        }),
    })
}

fn write_page(root: &Path, name: &str, html: &str) -> Result<PathBuf, TaskError> {
    let path = root.join(name);
    fs::write(&path, html).map_err(|source| TaskError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn summarize(content: &Map<String, Value>) -> String {
    if content.is_empty() {
        "empty".to_string()
    } else {
        format!("object · {} keys", content.len())
    }
}

fn page_head(title: &str) -> String {
    format!(
        "<!doctype html>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>{STYLE}</style>\n\
         <div class=\"nav\"><a href=\"{DASHBOARD_PAGE}\">Dashboard</a><a href=\"{VOLUMES_PAGE}\">Volumes Status</a></div>\n"
    )
}

fn task_toolbar() -> String {
    let mut html = String::from("<div class=\"toolbar\">\n");
    for task in TaskId::ALL {
        html.push_str(&format!(
            "<button class=\"btn\" onclick=\"runTask('{name}')\">{name}</button>\n",
            name = task.name()
        ));
    }
    html.push_str("<span id=\"runStatus\" class=\"muted\"></span>\n</div>\n");
    html.push_str(RUN_SCRIPT);
    html.push('\n');
    html
}

fn master_page(ctx: &TaskContext) -> String {
    let mut html = page_head("Proposal Status Dashboard");
    html.push_str("<h1>Proposal Status Dashboard</h1>\n");
    html.push_str(&task_toolbar());

    html.push_str("<table><tr><th>Document</th><th>Summary</th></tr>\n");
    for doc in DocumentId::ALL {
        let content = ctx.store.read(doc);
        let class = if content.is_empty() { "muted" } else { "ok" };
        html.push_str(&format!(
            "<tr><td>{}</td><td class=\"{}\">{}</td></tr>\n",
            doc.file_name(),
            class,
            summarize(&content)
        ));
    }
    html.push_str("</table>\n");

    let dash = ctx.store.read(DocumentId::Dashboard);
    html.push_str("<h2>Check freshness</h2>\n");
    html.push_str("<table><tr><th>Check</th><th>Last run</th><th>Status</th></tr>\n");
    if let Some(beats) = dash.get(HEARTBEAT_SECTION).and_then(Value::as_object) {
        for (task, entry) in beats {
            let last_run = entry
                .get("last_run")
                .and_then(Value::as_str)
                .unwrap_or("—");
            let ok = entry.get("ok").and_then(Value::as_bool).unwrap_or(false);
            let (class, label) = if ok { ("ok", "OK") } else { ("bad", "FAILED") };
            html.push_str(&format!(
                "<tr><td>{task}</td><td class=\"muted\">{last_run}</td><td class=\"{class}\">{label}</td></tr>\n"
            ));
        }
    }
    html.push_str("</table>\n");

    html.push_str(&format!(
        "<p class=\"muted\">Last generated: {}</p>\n",
        crate::heartbeat::timestamp()
    ));
    html
}

fn volumes_page(ctx: &TaskContext) -> String {
    let dash = ctx.store.read(DocumentId::Dashboard);
    let status = dash.get("status").and_then(Value::as_object);
    let field = |key: &str| {
        status
            .and_then(|map| map.get(key))
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string()
    };

    let mut html = page_head("Volumes Status");
    html.push_str("<h1>Volumes Status</h1>\n<div class=\"card\">\n");
    html.push_str(&task_toolbar());
    html.push_str(&format!(
        "<div><strong>Overall:</strong> {}</div>\n",
        field("overall")
    ));
    html.push_str(&format!(
        "<div><strong>Volume 1 (Technical):</strong> {}</div>\n",
        field("vol1")
    ));
    html.push_str(&format!(
        "<div><strong>Volume 2 (Past Performance):</strong> {}</div>\n",
        field("vol2")
    ));
    html.push_str("</div>\n");
    html.push_str(&format!(
        "<p class=\"muted\">Last generated: {}</p>\n",
        crate::heartbeat::timestamp()
    ));
    html
}
