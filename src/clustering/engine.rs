use std::collections::{HashSet, VecDeque};

use anyhow::Result;
use tracing::info;

use super::similarity::cosine_distance;
use super::types::Cluster;
use super::{DEFAULT_EPS, DEFAULT_MIN_SAMPLES};
use crate::article::Article;
use crate::TARGET_PIPELINE;

/// Tunable parameters for the density grouping.
#[derive(Debug, Clone, Copy)]
pub struct ClusterParams {
    pub eps: f32,
    pub min_samples: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        ClusterParams {
            eps: DEFAULT_EPS,
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}

/// Group a batch of articles into near-duplicate clusters.
///
/// Density-based grouping over cosine distance: an article with at least
/// `min_samples` neighbors (itself included) within `eps` seeds a cluster,
/// which grows through other core articles; border articles join the first
/// cluster that reaches them. Everything left over becomes a singleton
/// tagged by input position.
///
/// The pass is fully deterministic for a given input order: seeds are
/// scanned in ascending index, neighbor lists are index-ordered, and no
/// associative container's iteration order is involved. Dense clusters come
/// out in discovery order, followed by singletons in index order.
///
/// # Arguments
/// * `articles` - The article batch, in acquisition order
/// * `embeddings` - Index-aligned embedding vectors, one per article
/// * `params` - Grouping radius and density floor
///
/// # Returns
/// * `Ok(Vec<Cluster>)` - Every article in exactly one cluster
/// * `Err` - If the embedding count doesn't match the article count
pub fn cluster_articles(
    articles: &[Article],
    embeddings: &[Vec<f32>],
    params: ClusterParams,
) -> Result<Vec<Cluster>> {
    if embeddings.len() != articles.len() {
        return Err(anyhow::anyhow!(
            "Embedding count doesn't match article count: {} vs {}",
            embeddings.len(),
            articles.len()
        ));
    }

    if articles.is_empty() {
        return Ok(Vec::new());
    }

    let n = articles.len();

    // Pairwise eps-neighborhoods, computed once. Both directions are pushed
    // in ascending index order, so each list stays sorted.
    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); n];
    for i in 0..n {
        for j in (i + 1)..n {
            if cosine_distance(&embeddings[i], &embeddings[j]) <= params.eps {
                neighbors[i].push(j);
                neighbors[j].push(i);
            }
        }
    }

    let is_core = |idx: usize| neighbors[idx].len() + 1 >= params.min_samples;

    // Grow clusters from core points, scanning seeds in input order.
    let mut labels: Vec<Option<usize>> = vec![None; n];
    let mut num_clusters = 0;
    for seed in 0..n {
        if labels[seed].is_some() || !is_core(seed) {
            continue;
        }

        let cluster_idx = num_clusters;
        num_clusters += 1;
        labels[seed] = Some(cluster_idx);

        let mut frontier = VecDeque::from([seed]);
        while let Some(point) = frontier.pop_front() {
            // Border points join the cluster but don't expand it.
            if !is_core(point) {
                continue;
            }
            for &neighbor in &neighbors[point] {
                if labels[neighbor].is_none() {
                    labels[neighbor] = Some(cluster_idx);
                    frontier.push_back(neighbor);
                }
            }
        }
    }

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); num_clusters];
    for idx in 0..n {
        if let Some(cluster_idx) = labels[idx] {
            members[cluster_idx].push(idx);
        }
    }

    let mut clusters = Vec::new();
    for (cluster_idx, indices) in members.iter().enumerate() {
        clusters.push(build_cluster(
            format!("cluster_{}", cluster_idx),
            indices,
            articles,
        ));
    }
    for idx in 0..n {
        if labels[idx].is_none() {
            clusters.push(build_cluster(format!("singleton_{}", idx), &[idx], articles));
        }
    }

    info!(
        target: TARGET_PIPELINE,
        "Formed {} clusters from {} articles",
        clusters.len(),
        n
    );

    Ok(clusters)
}

fn build_cluster(id: String, member_indices: &[usize], articles: &[Article]) -> Cluster {
    let members: Vec<Article> = member_indices.iter().map(|&i| articles[i].clone()).collect();

    let mut entities = Vec::new();
    let mut seen = HashSet::new();
    for article in &members {
        for entity in &article.entities {
            if seen.insert(entity.clone()) {
                entities.push(entity.clone());
            }
        }
    }

    Cluster {
        id,
        articles: members,
        entities,
    }
}
