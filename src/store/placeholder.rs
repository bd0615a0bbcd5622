//! Built-in listings shown when the API is down and nothing has been stored.

use crate::models::{ExperienceLevel, JobRecord, JobType, RemotePolicy};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Sample postings. Ids are prefixed with `placeholder-` so they are never
/// confused with server ids.
pub fn placeholder_jobs() -> Vec<JobRecord> {
    vec![
        JobRecord {
            id: "placeholder-1".into(),
            title: "Senior Frontend Developer".into(),
            company: "TechCorp".into(),
            location: "San Francisco, CA".into(),
            salary: "$120k - $150k".into(),
            description: "Build responsive interfaces for a growing SaaS product.".into(),
            requirements: strings(&["5+ years of React", "TypeScript", "CSS architecture"]),
            responsibilities: strings(&["Own UI features end to end", "Review code"]),
            benefits: strings(&["Health insurance", "401(k) matching"]),
            remote: RemotePolicy::Hybrid,
            experience_level: ExperienceLevel::Senior,
            ..JobRecord::default()
        },
        JobRecord {
            id: "placeholder-2".into(),
            title: "Backend Engineer".into(),
            company: "DataFlow".into(),
            location: "Remote".into(),
            job_type: JobType::Remote,
            salary: "$100k - $130k".into(),
            description: "Design and operate the APIs behind our data pipeline.".into(),
            requirements: strings(&["Rust or Go", "PostgreSQL", "Distributed systems"]),
            responsibilities: strings(&["Build services", "Improve reliability"]),
            benefits: strings(&["Flexible hours", "Learning budget"]),
            remote: RemotePolicy::Remote,
            ..JobRecord::default()
        },
        JobRecord {
            id: "placeholder-3".into(),
            title: "Junior Data Analyst".into(),
            company: "Insightful".into(),
            location: "New York, NY".into(),
            job_type: JobType::Contract,
            salary: "$60k - $75k".into(),
            description: "Turn product metrics into weekly reports and dashboards.".into(),
            requirements: strings(&["SQL", "Spreadsheet modelling"]),
            responsibilities: strings(&["Maintain dashboards", "Support product reviews"]),
            experience_level: ExperienceLevel::Junior,
            ..JobRecord::default()
        },
    ]
}
