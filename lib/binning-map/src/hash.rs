/// [`BuildHasher`][std::hash::BuildHasher] implementation used for the resolution cache.
///
/// Currently, [`foldhash`][foldhash] is used as the underlying implementation.
///
/// [foldhash]: http://github.com/orlp/foldhash
pub(crate) type FastBuildHasher = foldhash::quality::RandomState;

/// A hash map based on `hashbrown` ([`HashMap`][hashbrown::HashMap]) using [`FastBuildHasher`].
pub(crate) type FastHashMap<K, V> = hashbrown::HashMap<K, V, FastBuildHasher>;
