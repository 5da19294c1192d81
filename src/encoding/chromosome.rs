use crate::phenotype::Phenotype;
use crate::rng::RandomNumberGenerator;

/// A permutation of free items and placeholders over the available slots.
///
/// Gene values are `0..len`. A value below `free_items` names the free item at
/// that index of [`Encoding::free_items`](super::Encoding::free_items); every
/// other value is a placeholder that leaves its slot empty. Keeping the
/// placeholders distinct makes the chromosome a true permutation, which the
/// partially-matched crossover relies on.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chromosome {
    genes: Vec<usize>,
    free_items: usize,
}

impl Chromosome {
    /// The chromosome placing free item `i` into available slot `i`.
    pub fn identity(slots: usize, free_items: usize) -> Self {
        Self {
            genes: (0..slots).collect(),
            free_items,
        }
    }

    /// Builds a chromosome from raw genes. Returns `None` unless `genes` is a
    /// permutation of `0..genes.len()` with `free_items <= genes.len()`.
    pub fn from_genes(genes: Vec<usize>, free_items: usize) -> Option<Self> {
        if free_items > genes.len() {
            return None;
        }
        let mut seen = vec![false; genes.len()];
        for &gene in &genes {
            if gene >= genes.len() || seen[gene] {
                return None;
            }
            seen[gene] = true;
        }
        Some(Self { genes, free_items })
    }

    pub fn genes(&self) -> &[usize] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn free_items(&self) -> usize {
        self.free_items
    }

    /// The free-item index placed at `position`, or `None` for a placeholder.
    pub fn item_at(&self, position: usize) -> Option<usize> {
        let gene = self.genes[position];
        (gene < self.free_items).then_some(gene)
    }

    pub(crate) fn shuffle(&mut self, rng: &mut RandomNumberGenerator) {
        rng.shuffle(&mut self.genes);
    }
}

impl Phenotype for Chromosome {
    /// Partially-matched crossover over a random segment. Genes inside the
    /// segment are exchanged and the displaced values are moved to where their
    /// counterparts used to be, so both children stay permutations.
    fn crossover(&mut self, other: &mut Self, rng: &mut RandomNumberGenerator) {
        let size = self.genes.len().min(other.genes.len());
        if size < 2 {
            return;
        }

        let mut pos1 = vec![0; size];
        let mut pos2 = vec![0; size];
        for i in 0..size {
            pos1[self.genes[i]] = i;
            pos2[other.genes[i]] = i;
        }

        let mut start = rng.gen_inclusive(0, size);
        let mut end = rng.gen_inclusive(0, size - 1);
        if end >= start {
            end += 1;
        } else {
            std::mem::swap(&mut start, &mut end);
        }

        for i in start..end {
            let gene1 = self.genes[i];
            let gene2 = other.genes[i];

            self.genes[i] = gene2;
            self.genes[pos1[gene2]] = gene1;
            other.genes[i] = gene1;
            other.genes[pos2[gene1]] = gene2;

            pos1.swap(gene1, gene2);
            pos2.swap(gene1, gene2);
        }
    }

    /// Index-shuffle mutation: every position is, with probability `indpb`,
    /// swapped with a different position drawn uniformly.
    fn mutate(&mut self, indpb: f64, rng: &mut RandomNumberGenerator) -> bool {
        let size = self.genes.len();
        if size < 2 {
            return false;
        }

        let mut changed = false;
        for i in 0..size {
            if rng.gen_probability() < indpb {
                let mut j = rng.gen_index(size - 1);
                if j >= i {
                    j += 1;
                }
                self.genes.swap(i, j);
                changed = true;
            }
        }
        changed
    }
}
