//! Lazy axis generators over sequences of seed contexts.
//!
//! Every axis is the same state machine: a seed cursor, a context walking the
//! current seed's subtree or ancestor chain, and a depth relative to the seed.
//! What differs is the [`Step`] policy deciding where the walk goes next.
//!
//! [`AxisIter`] is a single pass. [`AxisRange`] keeps the seed source and
//! hands out a fresh pass from the start of the seeds on every
//! [`AxisRange::iter`], so the same range can be consumed repeatedly.
use core::fmt;
use core::iter;
use core::marker::PhantomData;

use crate::context::Context;
use crate::model::TreeNode;

/// Movement rules of one axis.
///
/// `enter` positions a fresh seed on its first result, `advance` moves to the
/// next result of the same seed. Both report whether a result is available;
/// `depth` starts at zero for every seed.
pub trait Step {
    const NAME: &'static str;

    fn enter<N: TreeNode>(ctx: &mut Context<N>, depth: &mut usize) -> bool;
    fn advance<N: TreeNode>(ctx: &mut Context<N>, depth: &mut usize) -> bool;
}

/// First child, then its following siblings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Children;

/// Pre-order walk of the seed's subtree, seed excluded.
#[derive(Debug, Clone, Copy, Default)]
pub struct Descendants;

/// Parent, grandparent, up to and including the root.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ancestors;

/// The immediate parent only.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parents;

impl Step for Children {
    const NAME: &'static str = "child";

    fn enter<N: TreeNode>(ctx: &mut Context<N>, _depth: &mut usize) -> bool {
        if !ctx.has_children() {
            return false;
        }
        ctx.first_child();
        true
    }

    fn advance<N: TreeNode>(ctx: &mut Context<N>, _depth: &mut usize) -> bool {
        if !ctx.has_next_sibling() {
            return false;
        }
        ctx.next_sibling();
        true
    }
}

impl Step for Descendants {
    const NAME: &'static str = "descendant";

    fn enter<N: TreeNode>(ctx: &mut Context<N>, depth: &mut usize) -> bool {
        if !ctx.has_children() {
            return false;
        }
        ctx.first_child();
        *depth = 1;
        true
    }

    fn advance<N: TreeNode>(ctx: &mut Context<N>, depth: &mut usize) -> bool {
        if ctx.has_children() {
            ctx.first_child();
            *depth += 1;
            return true;
        }
        // sideways if possible, otherwise climb; back at depth 0 means the
        // subtree is done
        while *depth > 0 {
            if ctx.has_next_sibling() {
                ctx.next_sibling();
                return true;
            }
            ctx.parent();
            *depth -= 1;
        }
        false
    }
}

impl Step for Ancestors {
    const NAME: &'static str = "ancestor";

    fn enter<N: TreeNode>(ctx: &mut Context<N>, depth: &mut usize) -> bool {
        Self::advance(ctx, depth)
    }

    fn advance<N: TreeNode>(ctx: &mut Context<N>, _depth: &mut usize) -> bool {
        if ctx.is_null() || ctx.is_root() {
            return false;
        }
        ctx.parent();
        true
    }
}

impl Step for Parents {
    const NAME: &'static str = "parent";

    fn enter<N: TreeNode>(ctx: &mut Context<N>, depth: &mut usize) -> bool {
        Ancestors::advance(ctx, depth)
    }

    fn advance<N: TreeNode>(_ctx: &mut Context<N>, _depth: &mut usize) -> bool {
        false
    }
}

/// One pass of an axis over a seed iterator.
pub struct AxisIter<I: Iterator, S> {
    seeds: I,
    current: Option<I::Item>,
    depth: usize,
    step: PhantomData<S>,
}

impl<I: Iterator, S> AxisIter<I, S> {
    pub fn new(seeds: I) -> Self {
        Self { seeds, current: None, depth: 0, step: PhantomData }
    }
}

impl<I, S> Clone for AxisIter<I, S>
where
    I: Iterator + Clone,
    I::Item: Clone,
{
    fn clone(&self) -> Self {
        Self { seeds: self.seeds.clone(), current: self.current.clone(), depth: self.depth, step: PhantomData }
    }
}

impl<N, I, S> Iterator for AxisIter<I, S>
where
    N: TreeNode,
    I: Iterator<Item = Context<N>>,
    S: Step,
{
    type Item = Context<N>;

    fn next(&mut self) -> Option<Context<N>> {
        loop {
            if let Some(ctx) = self.current.as_mut()
                && S::advance(ctx, &mut self.depth)
            {
                return Some(ctx.clone());
            }
            let Some(mut seed) = self.seeds.next() else {
                self.current = None;
                return None;
            };
            tracing::trace!(axis = S::NAME, seed = ?seed.node(), "axis moved to next seed");
            self.depth = 0;
            if S::enter(&mut seed, &mut self.depth) {
                let found = seed.clone();
                self.current = Some(seed);
                return Some(found);
            }
            self.current = None;
        }
    }
}

impl<N, I, S> iter::FusedIterator for AxisIter<I, S>
where
    N: TreeNode,
    I: iter::FusedIterator<Item = Context<N>>,
    S: Step,
{
}

impl<I: Iterator, S: Step> fmt::Debug for AxisIter<I, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AxisIter").field("axis", &S::NAME).field("depth", &self.depth).finish_non_exhaustive()
    }
}

/// A restartable axis: seed source plus policy.
pub struct AxisRange<Src, S> {
    seeds: Src,
    step: PhantomData<S>,
}

impl<Src: Clone, S> Clone for AxisRange<Src, S> {
    fn clone(&self) -> Self {
        Self { seeds: self.seeds.clone(), step: PhantomData }
    }
}

impl<N, Src, S> AxisRange<Src, S>
where
    N: TreeNode,
    Src: IntoIterator<Item = Context<N>> + Clone,
    S: Step,
{
    pub fn new(seeds: Src) -> Self {
        Self { seeds, step: PhantomData }
    }

    /// Starts a new pass from the first seed.
    pub fn iter(&self) -> AxisIter<Src::IntoIter, S> {
        AxisIter::new(self.seeds.clone().into_iter())
    }
}

impl<N, Src, S> IntoIterator for &AxisRange<Src, S>
where
    N: TreeNode,
    Src: IntoIterator<Item = Context<N>> + Clone,
    S: Step,
{
    type Item = Context<N>;
    type IntoIter = AxisIter<Src::IntoIter, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<N, Src, S> IntoIterator for AxisRange<Src, S>
where
    N: TreeNode,
    Src: IntoIterator<Item = Context<N>>,
    S: Step,
{
    type Item = Context<N>;
    type IntoIter = AxisIter<Src::IntoIter, S>;

    fn into_iter(self) -> Self::IntoIter {
        AxisIter::new(self.seeds.into_iter())
    }
}

/// One-element seed sequence.
pub fn singleton<N: TreeNode>(ctx: Context<N>) -> iter::Once<Context<N>> {
    iter::once(ctx)
}

pub fn children<N, Src>(seeds: Src) -> AxisRange<Src, Children>
where
    N: TreeNode,
    Src: IntoIterator<Item = Context<N>> + Clone,
{
    AxisRange::new(seeds)
}

pub fn descendants<N, Src>(seeds: Src) -> AxisRange<Src, Descendants>
where
    N: TreeNode,
    Src: IntoIterator<Item = Context<N>> + Clone,
{
    AxisRange::new(seeds)
}

pub fn ancestors<N, Src>(seeds: Src) -> AxisRange<Src, Ancestors>
where
    N: TreeNode,
    Src: IntoIterator<Item = Context<N>> + Clone,
{
    AxisRange::new(seeds)
}

pub fn parents<N, Src>(seeds: Src) -> AxisRange<Src, Parents>
where
    N: TreeNode,
    Src: IntoIterator<Item = Context<N>> + Clone,
{
    AxisRange::new(seeds)
}

/// Axis selector used by expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Child,
    Descendant,
    Ancestor,
    Parent,
}

impl Axis {
    pub fn name(self) -> &'static str {
        match self {
            Axis::Child => Children::NAME,
            Axis::Descendant => Descendants::NAME,
            Axis::Ancestor => Ancestors::NAME,
            Axis::Parent => Parents::NAME,
        }
    }

    /// Expands `seeds` along this axis.
    pub fn walk<'a, N, I>(self, seeds: I) -> Box<dyn Iterator<Item = Context<N>> + 'a>
    where
        N: TreeNode,
        I: Iterator<Item = Context<N>> + 'a,
    {
        match self {
            Axis::Child => Box::new(AxisIter::<_, Children>::new(seeds)),
            Axis::Descendant => Box::new(AxisIter::<_, Descendants>::new(seeds)),
            Axis::Ancestor => Box::new(AxisIter::<_, Ancestors>::new(seeds)),
            Axis::Parent => Box::new(AxisIter::<_, Parents>::new(seeds)),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
