//! Tether member resolution
//!
//! This crate turns a binding path segment plus a registered type into
//! concrete accessor members:
//! - Member model with a closed kind discriminator ([`Member`])
//! - Provider components, one per resolution strategy ([`providers`])
//! - Priority-ranked selection with ambiguity detection ([`MemberSelector`])
//! - Request-shaped caching with type-scoped invalidation ([`MemberCache`])
//! - Indexer accessor decoration ([`IndexerAccessorDecorator`])
//! - The pipeline owner ([`MemberManager`])

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cache;
pub mod indexer;
pub mod manager;
pub mod member;
pub mod path;
pub mod priority;
pub mod providers;
pub mod selector;

pub use cache::{CacheKey, InvalidationListener, MemberCache};
pub use indexer::IndexerAccessorDecorator;
pub use manager::{MemberManager, MemberManagerBuilder};
pub use member::{
    ArgSpecificity, Member, MemberCandidates, MemberFlags, MemberKind, MemberKindMask,
    MemberOrigin, MemberPayload, MemberRef, MethodMember,
};
pub use priority::member_priority;
pub use providers::{
    component_priority, AttachedMemberProvider, DeclaredMemberProvider, DynamicMemberHandler,
    DynamicMemberProvider, ExtensionMemberProvider, ExtensionMethod, FakeMemberProvider,
    MemberProviderComponent, ResolutionContext, FAKE_MEMBER_PREFIX, FAKE_MEMBER_PREFIX_SYMBOL,
};
pub use selector::MemberSelector;
