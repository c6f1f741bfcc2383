//! Self-contained HTML CV: one document, inline styles, no external assets.

use super::html::HtmlWriter;
use crate::models::{Assessment, Certificate, Profile, Project};

const STYLE: &str = "body{font-family:Arial,Helvetica,sans-serif;max-width:800px;margin:40px auto;color:#222;line-height:1.5}\
h1{margin-bottom:4px}\
h2{border-bottom:2px solid #444;padding-bottom:4px;margin-top:32px}\
ul{padding-left:20px}\
li{margin-bottom:10px}\
table{border-collapse:collapse;width:100%}\
th,td{border:1px solid #ccc;padding:6px 10px;text-align:left}\
th{background:#f2f2f2}";

/// Everything a CV is built from.
pub struct CvDocument<'a> {
    pub profile: &'a Profile,
    pub projects: &'a [Project],
    pub certificates: &'a [Certificate],
    pub assessments: &'a [Assessment],
}

pub fn render_cv(doc: &CvDocument<'_>) -> String {
    let name = doc.profile.full_name.as_deref().unwrap_or_default();
    let mut w = HtmlWriter::new();

    w.raw("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>")
        .text(name)
        .raw(" - CV</title>\n<style>")
        .raw(STYLE)
        .raw("</style>\n</head>\n<body>\n");

    w.element("h1", name).raw("\n");
    if let Some(email) = &doc.profile.email {
        w.element("p", email).raw("\n");
    }
    w.element("p", doc.profile.bio.as_deref().unwrap_or_default())
        .raw("\n");

    w.raw("<h2>Projects</h2>\n<ul>\n");
    for project in doc.projects {
        w.raw("<li>").element("strong", &project.title);
        if let Some(kind) = &project.project_type {
            w.raw(" (").text(kind).raw(")");
        }
        if let Some(demo) = &project.demo_link {
            w.raw(" - ").link(demo, "Demo");
        }
        if let Some(description) = &project.description {
            w.raw("<br>").text(description);
        }
        w.raw("</li>\n");
    }
    w.raw("</ul>\n");

    w.raw("<h2>Certificates</h2>\n<ul>\n");
    for cert in doc.certificates {
        w.raw("<li>").element("strong", &cert.name);
        if let Some(issuer) = &cert.issuer {
            w.raw(" - ").text(issuer);
        }
        if let Some(date) = cert.issued_date {
            w.raw(" (").text(&date.format("%Y-%m-%d").to_string()).raw(")");
        }
        w.raw("</li>\n");
    }
    w.raw("</ul>\n");

    w.raw("<h2>Skill Assessments</h2>\n<table>\n<thead><tr><th>Skill</th><th>Score</th><th>Evaluator</th></tr></thead>\n<tbody>\n");
    for assessment in doc.assessments {
        w.raw("<tr>")
            .element("td", &assessment.skill_name)
            .element("td", &assessment.score.to_string())
            .element("td", assessment.evaluator.as_deref().unwrap_or("N/A"))
            .raw("</tr>\n");
    }
    w.raw("</tbody>\n</table>\n</body>\n</html>\n");

    w.finish()
}
