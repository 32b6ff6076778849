// Entity Deduplication Cache
//
// One cache lives for exactly one import run. It hands out at most one
// instance per natural key for every shared entity kind, and remembers which
// instances were created since the last flush so each row is written once.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use super::parser::parse_prefixed_id;
use super::Result;
use crate::models::{Ena, Enzyme, GeneFamily, Mgd, PubMed, RefSeq, Rgd, SharedKind, UniProt};

/// Monotonic id source, starting at 1
#[derive(Debug, Clone)]
pub struct IdSequence {
    next: i64,
}

impl Default for IdSequence {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdSequence {
    pub fn next_id(&mut self) -> i64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> i64 {
        self.next - 1
    }
}

/// Natural key -> instance map for one shared entity kind
#[derive(Debug)]
pub struct SharedCache<K, E> {
    entries: HashMap<K, Arc<E>>,
    pending: Vec<Arc<E>>,
    ids: IdSequence,
}

impl<K, E> Default for SharedCache<K, E> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            pending: Vec::new(),
            ids: IdSequence::default(),
        }
    }
}

impl<K: Eq + Hash, E> SharedCache<K, E> {
    /// Return the instance for `key`, building it with the next id if unseen
    pub fn get_or_create<F>(&mut self, key: K, constructor: F) -> Arc<E>
    where
        F: FnOnce(i64) -> E,
    {
        match self.entries.entry(key) {
            Entry::Occupied(existing) => Arc::clone(existing.get()),
            Entry::Vacant(slot) => {
                let entity = Arc::new(constructor(self.ids.next_id()));
                self.pending.push(Arc::clone(&entity));
                Arc::clone(slot.insert(entity))
            },
        }
    }

    pub fn get(&self, key: &K) -> Option<Arc<E>> {
        self.entries.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Instances created since the previous call, in creation order
    pub fn take_pending(&mut self) -> Vec<Arc<E>> {
        std::mem::take(&mut self.pending)
    }
}

/// Run-scoped caches for every shared entity kind
///
/// Each accessor takes the identifier as it appears in the source document
/// and derives the natural key from it. Identifiers that cannot yield a key
/// (e.g. `MGI:abc`) fail with a parse error.
#[derive(Debug, Default)]
pub struct DedupCache {
    pub gene_families: SharedCache<i64, GeneFamily>,
    pub ref_seqs: SharedCache<String, RefSeq>,
    pub rgds: SharedCache<i64, Rgd>,
    pub mgds: SharedCache<i64, Mgd>,
    pub uniprots: SharedCache<String, UniProt>,
    pub pubmeds: SharedCache<i64, PubMed>,
    pub enas: SharedCache<String, Ena>,
    pub enzymes: SharedCache<String, Enzyme>,
}

impl DedupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keyed by family identifier; the first name seen for an identifier wins
    pub fn gene_family(&mut self, family_identifier: i64, family_name: &str) -> Arc<GeneFamily> {
        self.gene_families
            .get_or_create(family_identifier, |id| GeneFamily {
                id,
                family_identifier,
                family_name: family_name.to_string(),
            })
    }

    pub fn ref_seq(&mut self, accession: &str) -> Arc<RefSeq> {
        let accession = accession.trim();
        self.ref_seqs.get_or_create(accession.to_string(), |id| RefSeq {
            id,
            accession: accession.to_string(),
        })
    }

    /// `RGD:<int>` or a bare integer
    pub fn rgd(&mut self, raw: &str) -> Result<Arc<Rgd>> {
        let rgdid = parse_prefixed_id(raw)?;
        Ok(self.rgds.get_or_create(rgdid, |id| Rgd { id, rgdid }))
    }

    /// `MGI:<int>` or a bare integer
    pub fn mgd(&mut self, raw: &str) -> Result<Arc<Mgd>> {
        let mgdid = parse_prefixed_id(raw)?;
        Ok(self.mgds.get_or_create(mgdid, |id| Mgd { id, mgdid }))
    }

    pub fn uniprot(&mut self, accession: &str) -> Arc<UniProt> {
        let accession = accession.trim();
        self.uniprots.get_or_create(accession.to_string(), |id| UniProt {
            id,
            uniprotid: accession.to_string(),
        })
    }

    pub fn pubmed(&mut self, pubmedid: i64) -> Arc<PubMed> {
        self.pubmeds.get_or_create(pubmedid, |id| PubMed { id, pubmedid })
    }

    pub fn ena(&mut self, accession: &str) -> Arc<Ena> {
        let accession = accession.trim();
        self.enas.get_or_create(accession.to_string(), |id| Ena {
            id,
            enaid: accession.to_string(),
        })
    }

    pub fn enzyme(&mut self, ec_number: &str) -> Arc<Enzyme> {
        let ec_number = ec_number.trim();
        self.enzymes.get_or_create(ec_number.to_string(), |id| Enzyme {
            id,
            ec_number: ec_number.to_string(),
        })
    }

    /// Number of distinct natural keys seen for `kind`
    pub fn count(&self, kind: SharedKind) -> usize {
        match kind {
            SharedKind::GeneFamily => self.gene_families.len(),
            SharedKind::RefSeq => self.ref_seqs.len(),
            SharedKind::Rgd => self.rgds.len(),
            SharedKind::Mgd => self.mgds.len(),
            SharedKind::UniProt => self.uniprots.len(),
            SharedKind::PubMed => self.pubmeds.len(),
            SharedKind::Ena => self.enas.len(),
            SharedKind::Enzyme => self.enzymes.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_sequence() {
        let mut ids = IdSequence::default();
        assert_eq!(ids.issued(), 0);
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.issued(), 2);
    }

    #[test]
    fn test_same_key_returns_same_instance() {
        let mut cache = DedupCache::new();

        let first = cache.enzyme("1.1.1.1");
        let second = cache.enzyme("1.1.1.1");
        let other = cache.enzyme("1.1.1.2");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.id, 1);
        assert_eq!(other.id, 2);
        assert_eq!(cache.count(SharedKind::Enzyme), 2);
    }

    #[test]
    fn test_constructor_runs_once() {
        let mut cache: SharedCache<i64, String> = SharedCache::default();
        let mut calls = 0;

        for _ in 0..3 {
            cache.get_or_create(7, |id| {
                calls += 1;
                format!("entity-{}", id)
            });
        }

        assert_eq!(calls, 1);
        assert_eq!(cache.get(&7).as_deref().map(String::as_str), Some("entity-1"));
    }

    #[test]
    fn test_pending_is_drained_once() {
        let mut cache = DedupCache::new();
        cache.enzyme("1.1.1.1");
        cache.enzyme("1.1.1.1");
        cache.enzyme("3.4.21.4");

        let pending = cache.enzymes.take_pending();
        assert_eq!(pending.len(), 2);
        assert!(cache.enzymes.take_pending().is_empty());

        cache.enzyme("1.1.1.1");
        assert!(cache.enzymes.take_pending().is_empty());
    }

    #[test]
    fn test_prefixed_keys() {
        let mut cache = DedupCache::new();
        let a = cache.mgd("MGI:2152878").unwrap();
        let b = cache.mgd("2152878").unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.mgdid, 2152878);
        assert_eq!(cache.rgd("RGD:69417").unwrap().rgdid, 69417);
    }

    #[test]
    fn test_malformed_prefixed_key() {
        let mut cache = DedupCache::new();
        let err = cache.mgd("MGI:abc").unwrap_err();
        assert!(err.is_parse_error());
        assert!(cache.mgds.is_empty());
    }

    #[test]
    fn test_gene_family_first_name_wins() {
        let mut cache = DedupCache::new();
        cache.gene_family(594, "Immunoglobulin like domain containing");
        let again = cache.gene_family(594, "renamed");
        assert_eq!(again.family_name, "Immunoglobulin like domain containing");
        assert_eq!(cache.count(SharedKind::GeneFamily), 1);
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut cache = DedupCache::new();
        let pubmed = cache.pubmed(5);
        let mgd = cache.mgd("MGI:5").unwrap();
        assert_eq!(pubmed.id, 1);
        assert_eq!(mgd.id, 1);
        assert_eq!(cache.count(SharedKind::PubMed), 1);
        assert_eq!(cache.count(SharedKind::Mgd), 1);
    }
}
