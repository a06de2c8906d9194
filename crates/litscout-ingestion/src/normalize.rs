//! Raw source records → canonical Article.
//!
//! Pure per-source mappings. The source field stays a distinguishing field:
//! two records with identical titles from different sources are never merged
//! here (dedup is by title only, against the destination store, later).

use litscout_common::{Article, Source};

use crate::sources::arxiv::ArxivEntry;
use crate::sources::pubmed::PubMedRecord;

pub fn article_from_arxiv(entry: ArxivEntry) -> Article {
    Article::new(
        entry.title,
        entry.summary,
        entry.published,
        entry.link,
        Source::Arxiv,
    )
}

pub fn article_from_pubmed(record: PubMedRecord) -> Article {
    Article::new(
        record.title,
        record.abstract_text,
        record.pubdate,
        record.link,
        Source::PubMed,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arxiv_mapping() {
        let entry = ArxivEntry {
            title: "T".into(),
            published: "2024-01-01T09:00:00Z".into(),
            updated: "2024-02-01T10:00:00Z".into(),
            summary: "S".into(),
            link: "http://arxiv.org/abs/1".into(),
        };
        let a = article_from_arxiv(entry);
        assert_eq!(a.source, Source::Arxiv);
        assert_eq!(a.abstract_text, "S");
        assert_eq!(a.published, "2024-01-01T09:00:00Z");
        assert_eq!(a.relevance_pred, "TBD");
    }

    #[test]
    fn test_pubmed_mapping() {
        let record = PubMedRecord {
            pmid: "1".into(),
            title: "T".into(),
            abstract_text: "A".into(),
            pubdate: "2024-03-12".into(),
            link: "https://pubmed.ncbi.nlm.nih.gov/1".into(),
        };
        let a = article_from_pubmed(record);
        assert_eq!(a.source, Source::PubMed);
        assert_eq!(a.published, "2024-03-12");
        assert_eq!(a.topic_check, "N/A");
    }

    #[test]
    fn test_same_title_different_sources_stay_distinct() {
        let a = article_from_arxiv(ArxivEntry { title: "Same".into(), ..Default::default() });
        let p = article_from_pubmed(PubMedRecord { title: "Same".into(), ..Default::default() });
        assert_eq!(a.title, p.title);
        assert_ne!(a.source, p.source);
    }
}
