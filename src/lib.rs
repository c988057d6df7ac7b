//! Order-statistic and weighted-sampling collections for Rust.
//!
//! This crate provides two families of ordered associative containers built
//! on a single augmented red-black tree core:
//!
//! - [`OrderStatMap`] / [`OrderStatSet`] - ordered map/set with O(log n)
//!   *rank* operations: access the entry with the i-th smallest key
//!   ([`get_by_rank`](OrderStatMap::get_by_rank)), ask for the sorted
//!   position of a key ([`rank_of`](OrderStatMap::rank_of)), or index by
//!   [`Rank`].
//! - [`SamplingMap`] / [`SamplingSet`] - ordered map/set where every entry
//!   carries a numeric weight, with O(log n) random selection of an entry
//!   with probability proportional to its weight
//!   ([`sample`](SamplingMap::sample)).
//!
//! # Example
//!
//! ```
//! use tally_tree::{OrderStatMap, Rank};
//!
//! let mut scores = OrderStatMap::new();
//! scores.insert("Alice", 100);
//! scores.insert("Bob", 85);
//! scores.insert("Carol", 92);
//!
//! // Ordinary ordered-map operations.
//! assert_eq!(scores.get(&"Bob"), Some(&85));
//! assert_eq!(scores.len(), 3);
//!
//! // Order-statistic operations (O(log n)).
//! let (name, score) = scores.get_by_rank(1).unwrap();
//! assert_eq!((*name, *score), ("Bob", 85));
//! assert_eq!(scores.rank_of(&"Carol"), Some(2));
//! assert_eq!(scores[Rank(0)], 100);
//! ```
//!
//! Weighted sampling:
//!
//! ```
//! use tally_tree::SamplingMap;
//! use rand::SeedableRng;
//!
//! let mut jobs: SamplingMap<&str, u32, u32> = SamplingMap::new();
//! jobs.insert("compact", 0, 1);
//! jobs.insert("flush", 1, 3);
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! // "flush" is three times as likely as "compact".
//! let picked = jobs.sample(&mut rng);
//! assert!(!picked.is_null());
//! assert_eq!(jobs.total_weight(), 4);
//! ```
//!
//! # Cursors
//!
//! Entries are addressed by [`Cursor`], a copyable non-owning token. A
//! cursor stays valid across arbitrary insertions and removals of *other*
//! entries: nodes live in a slab pool that never relocates a live cell, and
//! deletion rewires links instead of moving payloads. Navigation
//! ([`next`](OrderStatMap::next), [`prev`](OrderStatMap::prev)) and
//! dereference ([`get_at`](OrderStatMap::get_at)) go through the owning
//! container.
//!
//! # Features
//!
//! - **`no_std` compatible** - only requires `alloc`.
//! - **No unsafe code** - the node store is handle-indexed, so the crate
//!   forbids `unsafe` outright.
//! - **O(log n) everything** - insert, remove, lookup, rank access and
//!   weighted sampling are all single root-to-leaf descents.
//!
//! # Implementation
//!
//! Both container families share one red-black tree whose nodes carry an
//! augmentation (a "tally"): a subtree entry count for the order-statistic
//! containers, or a subtree weight sum for the sampling containers. The
//! tally is repaired incrementally on every structural mutation, which is
//! what keeps rank and sampling descents logarithmic. The node kind is
//! selected at compile time; there is no runtime dispatch.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod cursor;
mod rank;
mod raw;
mod weight;

pub mod order_stat_map;
pub mod order_stat_set;
pub mod sampling_map;
pub mod sampling_set;

pub use cursor::Cursor;
pub use order_stat_map::OrderStatMap;
pub use order_stat_set::OrderStatSet;
pub use rank::Rank;
pub use sampling_map::SamplingMap;
pub use sampling_set::SamplingSet;
pub use weight::Weight;
