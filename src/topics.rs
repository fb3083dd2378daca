use anyhow::Result;

use curator_core::models::Topic;

use crate::config::Config;

/// `curate topics`: list every topic with its configured queries and
/// trusted sources.
pub fn list_topics(config: &Config) -> Result<()> {
    println!("{:<22} {:<18} {:>7}   TRUSTED", "TOPIC", "LABEL", "QUERIES");

    for topic in Topic::ALL {
        let (queries, trusted) = match config.topics.get(&topic) {
            Some(t) if !t.trusted_domains.is_empty() => {
                (t.queries.len(), t.trusted_domains.join(", "))
            }
            Some(t) => (t.queries.len(), "-".to_string()),
            None => (0, "NOT CONFIGURED".to_string()),
        };
        println!(
            "{:<22} {:<18} {:>7}   {}",
            topic.as_str(),
            topic.label(),
            queries,
            trusted
        );
    }

    Ok(())
}
