//! Comment tree assembly.
//!
//! Turns the flat, chronologically ordered comment list of one or more posts into
//! per-post forests of [`CommentNode`]s. The builder is a pure function over data
//! that was already fetched; it never touches the store.
//!
//! Every fetched comment is indexed first, then replies are linked to their
//! parents, so a reply created in the same instant as its parent still attaches.
//! A reply attaches only to a parent on the same post that is not newer than the
//! reply itself. Anything else, including a parent cycle, is an orphan and is
//! handled according to [`OrphanPolicy`].

use crate::models::{AuthorSummary, Comment, CommentNode};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use uuid::Uuid;

/// Top-level comment lists keyed by post id
pub type CommentForest = HashMap<Uuid, Vec<CommentNode>>;

/// Handling of replies whose parent is absent from the fetched set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// Drop the orphan together with its descendants
    #[default]
    Drop,
    /// Show the orphan as a top-level comment of its own post
    PromoteToRoot,
}

impl FromStr for OrphanPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "drop" => Ok(OrphanPolicy::Drop),
            "promote" | "promote_to_root" => Ok(OrphanPolicy::PromoteToRoot),
            other => Err(format!(
                "invalid orphan policy '{}': expected 'drop' or 'promote'",
                other
            )),
        }
    }
}

/// Distinct commenter ids, in first-seen order, for a single bulk author lookup.
pub fn distinct_author_ids(comments: &[Comment]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(comments.len());
    comments
        .iter()
        .map(|c| c.user_id)
        .filter(|id| seen.insert(*id))
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CommentTreeBuilder {
    policy: OrphanPolicy,
}

impl CommentTreeBuilder {
    pub fn new(policy: OrphanPolicy) -> Self {
        Self { policy }
    }

    /// Build the forest for `post_ids`.
    ///
    /// Every requested post gets an entry (possibly empty). Comments that belong to
    /// posts outside `post_ids` are ignored.
    pub fn build(
        &self,
        post_ids: &[Uuid],
        mut comments: Vec<Comment>,
        authors: &HashMap<Uuid, AuthorSummary>,
    ) -> CommentForest {
        let requested: HashSet<Uuid> = post_ids.iter().copied().collect();
        comments.retain(|c| requested.contains(&c.post_id));
        // Sibling order is (created_at, id) whatever order the store returned.
        comments.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let n = comments.len();
        let mut slot_of: HashMap<Uuid, usize> = HashMap::with_capacity(n);
        let mut duplicate = vec![false; n];
        for (idx, comment) in comments.iter().enumerate() {
            if slot_of.contains_key(&comment.id) {
                tracing::warn!(comment_id = %comment.id, "duplicate comment id in fetch result");
                duplicate[idx] = true;
            } else {
                slot_of.insert(comment.id, idx);
            }
        }

        let mut parent_of: Vec<Option<usize>> = comments
            .iter()
            .enumerate()
            .map(|(idx, comment)| {
                let parent = *slot_of.get(&comment.parent_comment_id?)?;
                let linked = parent != idx
                    && comments[parent].post_id == comment.post_id
                    && comments[parent].created_at <= comment.created_at;
                linked.then_some(parent)
            })
            .collect();

        let depth = Self::resolve_depths(&mut parent_of);

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut roots: Vec<usize> = Vec::new();
        for (idx, comment) in comments.iter().enumerate() {
            if duplicate[idx] {
                continue;
            }
            match (parent_of[idx], comment.parent_comment_id) {
                (Some(parent), _) => children[parent].push(idx),
                (None, None) => roots.push(idx),
                (None, Some(parent_id)) => match self.policy {
                    OrphanPolicy::Drop => {
                        tracing::debug!(
                            comment_id = %comment.id,
                            %parent_id,
                            "dropping orphaned reply"
                        );
                    }
                    OrphanPolicy::PromoteToRoot => roots.push(idx),
                },
            }
        }

        let mut slots: Vec<Option<CommentNode>> = comments
            .into_iter()
            .map(|c| {
                let author = authors.get(&c.user_id).cloned();
                Some(CommentNode::new(c, author))
            })
            .collect();

        // Deepest first: every subtree is complete before its parent claims it.
        let mut by_depth: Vec<usize> = (0..n).collect();
        by_depth.sort_by(|a, b| depth[*b].cmp(&depth[*a]));
        for idx in by_depth {
            if children[idx].is_empty() {
                continue;
            }
            let replies: Vec<CommentNode> = children[idx]
                .iter()
                .filter_map(|&child| slots[child].take())
                .collect();
            if let Some(node) = slots[idx].as_mut() {
                node.replies = replies;
            }
        }

        let mut forest: CommentForest = post_ids.iter().map(|id| (*id, Vec::new())).collect();
        for idx in roots {
            if let Some(node) = slots[idx].take() {
                forest.entry(node.comment.post_id).or_default().push(node);
            }
        }

        forest
    }

    /// Depth of every slot below its topmost linked ancestor.
    ///
    /// Equal timestamps allow parent cycles; the first slot found to close a
    /// cycle loses its parent link and becomes an orphan.
    fn resolve_depths(parent_of: &mut [Option<usize>]) -> Vec<usize> {
        let n = parent_of.len();
        let mut depth: Vec<Option<usize>> = vec![None; n];
        let mut on_path = vec![false; n];
        let mut path: Vec<usize> = Vec::new();

        for start in 0..n {
            let mut cur = start;
            loop {
                if depth[cur].is_some() {
                    break;
                }
                if on_path[cur] {
                    parent_of[cur] = None;
                    depth[cur] = Some(0);
                    break;
                }
                match parent_of[cur] {
                    None => {
                        depth[cur] = Some(0);
                        break;
                    }
                    Some(parent) => {
                        on_path[cur] = true;
                        path.push(cur);
                        cur = parent;
                    }
                }
            }

            while let Some(node) = path.pop() {
                on_path[node] = false;
                if depth[node].is_none() {
                    let above = parent_of[node].and_then(|p| depth[p]).map_or(0, |d| d + 1);
                    depth[node] = Some(above);
                }
            }
        }

        depth.into_iter().map(|d| d.unwrap_or(0)).collect()
    }
}
