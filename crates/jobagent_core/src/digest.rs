use std::fmt::Write;

use chrono::NaiveDate;

use crate::{JobPosting, JobSource};

pub const NO_RESULTS_MESSAGE: &str = "No new job listings found for your search criteria today.";

const NO_RESULTS_HINT: &str = "Try adjusting your search parameters or check back tomorrow!";

const DEGRADED_NOTICE: &str = "Demo mode: live search returned nothing, so these are sample \
listings. Each link opens the job board's search page for your criteria.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestEntry {
    /// 1-based position in the digest.
    pub ordinal: usize,
    pub title: String,
    pub link: String,
    pub source: JobSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestBody {
    Listings(Vec<DigestEntry>),
    NoResults,
}

/// Rendered summary of one search, handed unchanged to the mailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub role: String,
    pub location: String,
    pub date: NaiveDate,
    pub count: usize,
    pub degraded: bool,
    pub body: DigestBody,
}

/// Assemble a digest for `jobs`; an empty list yields [`DigestBody::NoResults`].
pub fn assemble_digest(jobs: &[JobPosting], role: &str, location: &str, date: NaiveDate) -> Digest {
    let body = if jobs.is_empty() {
        DigestBody::NoResults
    } else {
        DigestBody::Listings(
            jobs.iter()
                .enumerate()
                .map(|(idx, job)| DigestEntry {
                    ordinal: idx + 1,
                    title: job.title.clone(),
                    link: job.link.clone(),
                    source: job.source,
                })
                .collect(),
        )
    };

    Digest {
        role: role.to_string(),
        location: location.to_string(),
        date,
        count: jobs.len(),
        degraded: false,
        body,
    }
}

impl Digest {
    /// Tag the digest as built from synthetic postings.
    pub fn mark_degraded(mut self, degraded: bool) -> Self {
        self.degraded = degraded;
        self
    }

    pub fn subject(&self) -> String {
        format!("Daily Job Updates: {} in {}", self.role, self.location)
    }

    fn date_label(&self) -> String {
        self.date.format("%B %d, %Y").to_string()
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Your Daily Job Updates");
        let _ = writeln!(out, "Search: {} in {}", self.role, self.location);
        let _ = writeln!(out, "Date: {}", self.date_label());
        let _ = writeln!(out, "Jobs Found: {}", self.count);
        if self.degraded {
            let _ = writeln!(out, "\n{DEGRADED_NOTICE}");
        }
        out.push('\n');

        match &self.body {
            DigestBody::Listings(entries) => {
                let _ = writeln!(out, "Job Listings:");
                for entry in entries {
                    let _ = writeln!(out, "\n{}. {}", entry.ordinal, entry.title);
                    let _ = writeln!(out, "   Link: {}", entry.link);
                    let _ = writeln!(out, "   Source: {}", entry.source);
                }
            }
            DigestBody::NoResults => {
                let _ = writeln!(out, "{NO_RESULTS_MESSAGE}");
                let _ = writeln!(out, "{NO_RESULTS_HINT}");
            }
        }

        let _ = writeln!(out, "\n---\nSent by your AI Job Agent");
        let _ = writeln!(out, "This is an automated email. Please do not reply.");
        out
    }

    pub fn render_html(&self) -> String {
        let mut items = String::new();
        match &self.body {
            DigestBody::Listings(entries) => {
                items.push_str("<h3>Job Listings:</h3>\n");
                for entry in entries {
                    let _ = write!(
                        items,
                        r#"
    <div class="job-item">
        <div class="job-title">{ordinal}. {title}</div>
        <p><a href="{link}" class="job-link" target="_blank">View Job Application</a></p>
        <p class="job-source">Source: {source}</p>
    </div>
"#,
                        ordinal = entry.ordinal,
                        title = html_escape(&entry.title),
                        link = html_escape(&entry.link),
                        source = entry.source,
                    );
                }
            }
            DigestBody::NoResults => {
                let _ = write!(
                    items,
                    r#"
    <div class="job-item no-results">
        <p>{NO_RESULTS_MESSAGE}</p>
        <p>{NO_RESULTS_HINT}</p>
    </div>
"#
                );
            }
        }

        let notice = if self.degraded {
            format!(r#"<p class="notice">{DEGRADED_NOTICE}</p>"#)
        } else {
            String::new()
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .header {{ background-color: #f4f4f4; padding: 20px; border-radius: 5px; margin-bottom: 20px; }}
        .job-item {{ border: 1px solid #ddd; border-radius: 5px; padding: 15px; margin-bottom: 15px; }}
        .job-title {{ font-size: 18px; font-weight: bold; color: #2c3e50; margin-bottom: 10px; }}
        .job-link {{ color: #3498db; text-decoration: none; }}
        .job-source {{ color: #7f8c8d; font-size: 14px; }}
        .notice {{ color: #b45309; }}
        .footer {{ margin-top: 30px; padding-top: 20px; border-top: 1px solid #ddd; text-align: center; color: #7f8c8d; }}
    </style>
</head>
<body>
    <div class="header">
        <h2>Your Daily Job Updates</h2>
        <p><strong>Search:</strong> {role} in {location}</p>
        <p><strong>Date:</strong> {date}</p>
        <p><strong>Jobs Found:</strong> {count}</p>
        {notice}
    </div>
{items}
    <div class="footer">
        <p>Sent by your AI Job Agent</p>
        <p>This is an automated email. Please do not reply.</p>
    </div>
</body>
</html>
"#,
            role = html_escape(&self.role),
            location = html_escape(&self.location),
            date = self.date_label(),
            count = self.count,
        )
    }
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
