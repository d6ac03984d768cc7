//! Parallel or sequential row iteration, chosen by the `parallel` feature.
//!
//! Raster loops call `into_par_iter()` on a row range. With rayon enabled
//! that is a real parallel iterator; without it the shim below hands back the
//! plain iterator so the same `.map(..).collect()` chains still compile.
#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    /// Stand-in for `rayon::prelude::IntoParallelIterator`
    pub trait IntoParallelIterator {
        type Iter;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;
