use super::GeometryError;
use super::lattice::Lattice;
use super::provider::ExplicitGeometry;
use crate::core::models::site::SiteTemplate;
use nalgebra::{Matrix3, Point3, Vector3};
use phf::{Map, phf_map};

const POSITION_TOLERANCE: f64 = 1e-6;
const METRIC_TOLERANCE: f64 = 1e-6;

/// Affine map `x' = R x + t` on fractional coordinates of the conventional cell.
#[derive(Debug, Clone, Copy)]
pub struct CellOperation {
    pub name: &'static str,
    pub rotation: [[i32; 3]; 3],
    pub translation: [f64; 3],
}

impl CellOperation {
    const fn shift(name: &'static str, translation: [f64; 3]) -> Self {
        Self {
            name,
            rotation: [[1, 0, 0], [0, 1, 0], [0, 0, 1]],
            translation,
        }
    }

    fn rotation_matrix(&self) -> Matrix3<f64> {
        Matrix3::from_fn(|i, j| f64::from(self.rotation[i][j]))
    }

    fn apply(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation_matrix() * p.coords + Vector3::from(self.translation))
    }

    /// Whether the operation maps the `repetitions` supercell lattice onto itself and keeps
    /// the cell metric.
    fn fits(&self, repetitions: [u32; 3], metric: &Matrix3<f64>) -> bool {
        let n = repetitions.map(i64::from);
        let keeps_supercell = (0..3).all(|i| {
            (0..3).all(|j| (i64::from(self.rotation[i][j]) * n[j]) % n[i] == 0)
        });
        let r = self.rotation_matrix();
        keeps_supercell && (r.transpose() * metric * r - metric).amax() < METRIC_TOLERANCE
    }
}

/// Static description of a structure type: its conventional cell, one representative
/// coordinate per Wyckoff site and the space-group operations that expand them.
#[derive(Debug)]
pub struct PrototypeDef {
    pub name: &'static str,
    pub space_group: &'static str,
    pub space_group_number: u16,
    /// Default `[a, b, c, alpha, beta, gamma]` in Å and degrees.
    pub default_cell: [f64; 6],
    /// Centring vectors other than the origin.
    pub centring: &'static [CellOperation],
    /// Generators of the point operations, each with a translation part that makes it a
    /// member of the space group.
    pub operations: &'static [CellOperation],
    pub sites: &'static [PrototypeSite],
}

#[derive(Debug)]
pub struct PrototypeSite {
    pub label: &'static str,
    pub representative: [f64; 3],
}

const MIRROR_A: [[i32; 3]; 3] = [[-1, 0, 0], [0, 1, 0], [0, 0, 1]];
const MIRROR_B: [[i32; 3]; 3] = [[1, 0, 0], [0, -1, 0], [0, 0, 1]];
const MIRROR_C: [[i32; 3]; 3] = [[1, 0, 0], [0, 1, 0], [0, 0, -1]];
const SWAP_AB: [[i32; 3]; 3] = [[0, 1, 0], [1, 0, 0], [0, 0, 1]];
const SWAP_BC: [[i32; 3]; 3] = [[1, 0, 0], [0, 0, 1], [0, 1, 0]];
const SWAP_AC: [[i32; 3]; 3] = [[0, 0, 1], [0, 1, 0], [1, 0, 0]];

/// Mirrors and axis swaps generating m-3m; `glide` is the translation carried by the mirrors.
const fn cubic_operations(glide: [f64; 3]) -> [CellOperation; 6] {
    [
        CellOperation {
            name: "mirror-a",
            rotation: MIRROR_A,
            translation: glide,
        },
        CellOperation {
            name: "mirror-b",
            rotation: MIRROR_B,
            translation: glide,
        },
        CellOperation {
            name: "mirror-c",
            rotation: MIRROR_C,
            translation: glide,
        },
        CellOperation {
            name: "swap-ab",
            rotation: SWAP_AB,
            translation: [0.0; 3],
        },
        CellOperation {
            name: "swap-bc",
            rotation: SWAP_BC,
            translation: [0.0; 3],
        },
        CellOperation {
            name: "swap-ac",
            rotation: SWAP_AC,
            translation: [0.0; 3],
        },
    ]
}

static PM3M_OPERATIONS: [CellOperation; 6] = cubic_operations([0.0; 3]);
static FD3M_OPERATIONS: [CellOperation; 6] = cubic_operations([0.25; 3]);

static CUBIC_PEROVSKITE: PrototypeDef = PrototypeDef {
    name: "cubic-perovskite",
    space_group: "Pm-3m",
    space_group_number: 221,
    default_cell: [6.0, 6.0, 6.0, 90.0, 90.0, 90.0],
    centring: &[],
    operations: &PM3M_OPERATIONS,
    sites: &[
        PrototypeSite {
            label: "A",
            representative: [0.0, 0.0, 0.0],
        },
        PrototypeSite {
            label: "B",
            representative: [0.5, 0.5, 0.5],
        },
        PrototypeSite {
            label: "X",
            representative: [0.5, 0.5, 0.0],
        },
    ],
};

// Origin choice 1.
static SPINEL: PrototypeDef = PrototypeDef {
    name: "spinel",
    space_group: "Fd-3m",
    space_group_number: 227,
    default_cell: [8.0, 8.0, 8.0, 90.0, 90.0, 90.0],
    centring: &[
        CellOperation::shift("centre-bc", [0.0, 0.5, 0.5]),
        CellOperation::shift("centre-ac", [0.5, 0.0, 0.5]),
        CellOperation::shift("centre-ab", [0.5, 0.5, 0.0]),
    ],
    operations: &FD3M_OPERATIONS,
    sites: &[
        PrototypeSite {
            label: "A",
            representative: [0.0, 0.0, 0.0],
        },
        PrototypeSite {
            label: "B",
            representative: [0.625, 0.625, 0.625],
        },
        PrototypeSite {
            label: "X",
            representative: [0.3873, 0.3873, 0.3873],
        },
    ],
};

static WURTZITE: PrototypeDef = PrototypeDef {
    name: "wurtzite",
    space_group: "P6_3mc",
    space_group_number: 186,
    default_cell: [3.0, 3.0, 6.0, 90.0, 90.0, 120.0],
    centring: &[],
    operations: &[
        CellOperation {
            name: "screw-6",
            rotation: [[1, -1, 0], [1, 0, 0], [0, 0, 1]],
            translation: [0.0, 0.0, 0.5],
        },
        CellOperation {
            name: "mirror-diagonal",
            rotation: [[0, -1, 0], [-1, 0, 0], [0, 0, 1]],
            translation: [0.0; 3],
        },
        // Members of the group that survive supercells with unequal a and b repetitions.
        CellOperation {
            name: "screw-2",
            rotation: [[-1, 0, 0], [0, -1, 0], [0, 0, 1]],
            translation: [0.0, 0.0, 0.5],
        },
        CellOperation {
            name: "mirror-a",
            rotation: [[1, 0, 0], [1, -1, 0], [0, 0, 1]],
            translation: [0.0; 3],
        },
        CellOperation {
            name: "mirror-b",
            rotation: [[-1, 1, 0], [0, 1, 0], [0, 0, 1]],
            translation: [0.0; 3],
        },
    ],
    sites: &[
        PrototypeSite {
            label: "A",
            representative: [2.0 / 3.0, 1.0 / 3.0, 0.0],
        },
        PrototypeSite {
            label: "X",
            representative: [2.0 / 3.0, 1.0 / 3.0, 0.625],
        },
    ],
};

static PROTOTYPES: Map<&'static str, &'static PrototypeDef> = phf_map! {
    "cubic-perovskite" => &CUBIC_PEROVSKITE,
    "perovskite" => &CUBIC_PEROVSKITE,
    "spinel" => &SPINEL,
    "wurtzite" => &WURTZITE,
};

/// A structure prototype with a chosen cell and supercell size.
///
/// Expanded positions are always ordered site label first (in prototype order), then unit
/// cell `(i, j, k)` lexicographically, then position within the cell. Site templates,
/// geometries and sub-lattice templates all share this order, so index `n` means the same
/// atom everywhere.
#[derive(Debug, Clone)]
pub struct Prototype {
    def: &'static PrototypeDef,
    cell: [f64; 6],
    repetitions: [u32; 3],
}

impl Prototype {
    pub fn named(name: &str) -> Result<Self, GeometryError> {
        let key = name.trim().to_ascii_lowercase();
        let def = PROTOTYPES
            .get(key.as_str())
            .copied()
            .ok_or_else(|| GeometryError::UnknownPrototype(name.to_string()))?;
        Ok(Self {
            def,
            cell: def.default_cell,
            repetitions: [1, 1, 1],
        })
    }

    /// Names accepted by [`named`](Self::named), aliases included.
    pub fn available() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = PROTOTYPES.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn with_cell(mut self, cell: [f64; 6]) -> Self {
        self.cell = cell;
        self
    }

    pub fn with_repetitions(mut self, repetitions: [u32; 3]) -> Result<Self, GeometryError> {
        if repetitions.contains(&0) {
            return Err(GeometryError::InvalidRepetitions(repetitions));
        }
        self.repetitions = repetitions;
        Ok(self)
    }

    pub fn name(&self) -> &'static str {
        self.def.name
    }

    pub fn space_group(&self) -> (&'static str, u16) {
        (self.def.space_group, self.def.space_group_number)
    }

    pub fn cell(&self) -> [f64; 6] {
        self.cell
    }

    pub fn repetitions(&self) -> [u32; 3] {
        self.repetitions
    }

    pub fn site_labels(&self) -> Vec<&'static str> {
        self.def.sites.iter().map(|s| s.label).collect()
    }

    /// Lattice of the whole supercell.
    pub fn lattice(&self) -> Result<Lattice, GeometryError> {
        Ok(Lattice::from_cell(self.cell)?.scaled(self.repetitions))
    }

    /// One site per prototype label, with multiplicity equal to its number of positions in
    /// the supercell. Each label is its own equivalence class.
    pub fn site_template(&self) -> Result<SiteTemplate, GeometryError> {
        let cells = self.cell_count();
        let mut builder = SiteTemplate::builder();
        for site in self.def.sites {
            builder = builder.class(site.label).site(
                site.label,
                (self.unit_cell_positions(site).len() * cells) as i64,
                site.label,
            );
        }
        Ok(builder.build()?)
    }

    /// All positions of the supercell, in the same order as [`site_template`](Self::site_template)
    /// expands them.
    pub fn geometry(&self) -> Result<ExplicitGeometry, GeometryError> {
        let positions = self
            .def
            .sites
            .iter()
            .flat_map(|site| self.expand(site))
            .collect();
        Ok(ExplicitGeometry::new(self.lattice()?, positions))
    }

    /// The sites labelled `label` as a template of individually addressable positions
    /// (`{label}1`, `{label}2`, ...).
    ///
    /// The symmetry generators are the supercell translations, the centring translations and
    /// every space-group operation that maps the supercell lattice onto itself without
    /// distorting the chosen cell. Operations acting trivially on the sub-lattice are left out.
    pub fn sublattice_template(&self, label: &str) -> Result<SiteTemplate, GeometryError> {
        let site = self.site_def(label)?;
        let positions = self.expand(site);
        let scale = Vector3::from(self.repetitions.map(f64::from));

        let mut builder = SiteTemplate::builder().class(site.label);
        for n in 1..=positions.len() {
            builder = builder.site(&format!("{}{}", site.label, n), 1, site.label);
        }

        let mut generators: Vec<Vec<usize>> = Vec::new();
        for operation in self.symmetry_operations()? {
            let images = positions
                .iter()
                .map(|p| {
                    let moved = operation.apply(&Point3::from(p.coords.component_mul(&scale)));
                    let image = Point3::from(moved.coords.component_div(&scale));
                    positions
                        .iter()
                        .position(|q| same_position(&image, q))
                        .ok_or_else(|| GeometryError::BrokenSymmetry {
                            operation: operation.name.to_string(),
                            label: site.label.to_string(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let identity = images.iter().enumerate().all(|(i, &j)| i == j);
            if !identity && !generators.contains(&images) {
                generators.push(images);
            }
        }
        for images in generators {
            builder = builder.generator(images);
        }
        Ok(builder.build()?)
    }

    /// Positions of the sub-lattice `label`, in the order of
    /// [`sublattice_template`](Self::sublattice_template).
    pub fn sublattice_geometry(&self, label: &str) -> Result<ExplicitGeometry, GeometryError> {
        let site = self.site_def(label)?;
        Ok(ExplicitGeometry::new(self.lattice()?, self.expand(site)))
    }

    fn site_def(&self, label: &str) -> Result<&'static PrototypeSite, GeometryError> {
        self.def
            .sites
            .iter()
            .find(|s| s.label == label)
            .ok_or_else(|| GeometryError::UnknownSublattice {
                prototype: self.def.name.to_string(),
                label: label.to_string(),
            })
    }

    fn cell_count(&self) -> usize {
        self.repetitions.iter().map(|&n| n as usize).product()
    }

    /// Orbit of the site's representative under the centring and point operations, wrapped
    /// into the unit cell, in discovery order.
    fn unit_cell_positions(&self, site: &PrototypeSite) -> Vec<Point3<f64>> {
        let mut positions = vec![Point3::from(site.representative)];
        let mut next = 0;
        while let Some(current) = positions.get(next).copied() {
            next += 1;
            for operation in self.def.centring.iter().chain(self.def.operations) {
                let image = wrap(operation.apply(&current));
                if !positions.iter().any(|p| same_position(p, &image)) {
                    positions.push(image);
                }
            }
        }
        positions
    }

    fn expand(&self, site: &PrototypeSite) -> Vec<Point3<f64>> {
        let unit = self.unit_cell_positions(site);
        let [na, nb, nc] = self.repetitions;
        let mut positions = Vec::with_capacity(unit.len() * self.cell_count());
        for i in 0..na {
            for j in 0..nb {
                for k in 0..nc {
                    for p in &unit {
                        positions.push(Point3::new(
                            (p.x + f64::from(i)) / f64::from(na),
                            (p.y + f64::from(j)) / f64::from(nb),
                            (p.z + f64::from(k)) / f64::from(nc),
                        ));
                    }
                }
            }
        }
        positions
    }

    /// Candidate generators in unit-cell coordinates: one-cell translations along each axis,
    /// then centring, then the point operations compatible with this supercell and cell.
    fn symmetry_operations(&self) -> Result<Vec<CellOperation>, GeometryError> {
        let lattice = Lattice::from_cell(self.cell)?;
        let metric = lattice.matrix().transpose() * lattice.matrix();

        let mut operations = vec![
            CellOperation::shift("translate-a", [1.0, 0.0, 0.0]),
            CellOperation::shift("translate-b", [0.0, 1.0, 0.0]),
            CellOperation::shift("translate-c", [0.0, 0.0, 1.0]),
        ];
        operations.extend(self.def.centring.iter().copied());
        operations.extend(
            self.def
                .operations
                .iter()
                .filter(|op| op.fits(self.repetitions, &metric))
                .copied(),
        );
        Ok(operations)
    }
}

fn wrap(p: Point3<f64>) -> Point3<f64> {
    p.map(|x| {
        let w = x - x.floor();
        if 1.0 - w < POSITION_TOLERANCE { 0.0 } else { w }
    })
}

fn same_position(a: &Point3<f64>, b: &Point3<f64>) -> bool {
    (a - b).iter().all(|d| (d - d.round()).abs() < POSITION_TOLERANCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::provider::GeometryTemplate;
    use crate::core::symmetry::SiteSymmetry;
    use crate::engine::substitution::{self, Occupancy, SubstituentPool};

    fn single(label: &str, count: u32) -> SubstituentPool {
        SubstituentPool::new()
            .with("host", Occupancy::Any)
            .with(label, Occupancy::Exactly(count))
    }

    #[test]
    fn named_resolves_aliases_case_insensitively() {
        assert_eq!(
            Prototype::named("Perovskite").unwrap().name(),
            "cubic-perovskite"
        );
        assert_eq!(
            Prototype::named("wurtzite").unwrap().space_group(),
            ("P6_3mc", 186)
        );
        assert!(matches!(
            Prototype::named("fluorite"),
            Err(GeometryError::UnknownPrototype(_))
        ));
        assert!(Prototype::available().contains(&"spinel"));
    }

    #[test]
    fn perovskite_unit_cell_matches_abx3() {
        let prototype = Prototype::named("cubic-perovskite").unwrap();
        let template = prototype.site_template().unwrap();
        let geometry = prototype.geometry().unwrap();
        assert_eq!(template.total_positions(), 5);
        assert_eq!(geometry.site_count(), 5);
        assert_eq!(
            geometry.fractional_coordinate(1),
            Some(Point3::new(0.5, 0.5, 0.5))
        );
        assert_eq!(
            geometry.fractional_coordinate(2),
            Some(Point3::new(0.5, 0.5, 0.0))
        );
    }

    #[test]
    fn spinel_unit_cell_matches_ab2x4() {
        let prototype = Prototype::named("spinel").unwrap();
        assert_eq!(prototype.space_group(), ("Fd-3m", 227));
        let template = prototype.site_template().unwrap();
        let multiplicities: Vec<u32> = template.sites().iter().map(|s| s.multiplicity()).collect();
        assert_eq!(multiplicities, vec![8, 16, 32]);
        let geometry = prototype.geometry().unwrap();
        assert_eq!(geometry.site_count(), 56);
        assert!(
            geometry
                .positions()
                .iter()
                .all(|p| p.iter().all(|&x| (0.0..1.0).contains(&x)))
        );
    }

    #[test]
    fn wurtzite_positions_come_from_the_screw_axis() {
        let geometry = Prototype::named("wurtzite").unwrap().geometry().unwrap();
        assert_eq!(geometry.site_count(), 4);
        let second = geometry.fractional_coordinate(1).unwrap();
        assert!(same_position(&second, &Point3::new(1.0 / 3.0, 2.0 / 3.0, 0.5)));
        let last = geometry.fractional_coordinate(3).unwrap();
        assert!(same_position(&last, &Point3::new(1.0 / 3.0, 2.0 / 3.0, 0.125)));
    }

    #[test]
    fn supercell_scales_positions_and_lattice() {
        let prototype = Prototype::named("cubic-perovskite")
            .unwrap()
            .with_repetitions([2, 2, 2])
            .unwrap();
        let geometry = prototype.geometry().unwrap();
        assert_eq!(geometry.site_count(), 40);
        assert_eq!(prototype.site_template().unwrap().total_positions(), 40);
        // The second A position sits in cell (0, 0, 1).
        assert_eq!(
            geometry.fractional_coordinate(1),
            Some(Point3::new(0.0, 0.0, 0.5))
        );
        assert!((geometry.lattice().volume() - 8.0 * 216.0).abs() < 1e-6);
    }

    #[test]
    fn zero_repetitions_are_rejected() {
        assert!(matches!(
            Prototype::named("wurtzite").unwrap().with_repetitions([1, 0, 1]),
            Err(GeometryError::InvalidRepetitions([1, 0, 1]))
        ));
    }

    #[test]
    fn cubic_supercell_keeps_translations_and_axis_permutations() {
        let prototype = Prototype::named("cubic-perovskite")
            .unwrap()
            .with_repetitions([2, 2, 2])
            .unwrap();
        let template = prototype.sublattice_template("A").unwrap();
        assert_eq!(template.len(), 8);
        assert_eq!(template.site(0).unwrap().id(), "A1");
        // Mirrors fix every A site of a 2x2x2 cell, so only translations and swaps remain.
        assert_eq!(template.symmetry().generators().len(), 6);
        assert_eq!(template.symmetry().elements(1000).unwrap().len(), 48);
        assert_eq!(template.symmetry().degree(), 8);
    }

    #[test]
    fn distorted_cell_drops_the_broken_axis_swaps() {
        let prototype = Prototype::named("cubic-perovskite")
            .unwrap()
            .with_cell([4.0, 4.0, 5.0, 90.0, 90.0, 90.0])
            .with_repetitions([2, 2, 2])
            .unwrap();
        let template = prototype.sublattice_template("A").unwrap();
        assert_eq!(template.symmetry().generators().len(), 4);
        assert_eq!(template.symmetry().elements(1000).unwrap().len(), 16);
    }

    #[test]
    fn mirror_images_along_a_chain_are_merged() {
        let prototype = Prototype::named("cubic-perovskite")
            .unwrap()
            .with_repetitions([6, 1, 1])
            .unwrap();
        let template = prototype.sublattice_template("A").unwrap();
        // Translations and the mirror make the dihedral group of the hexagon.
        assert_eq!(template.symmetry().elements(1000).unwrap().len(), 12);
        let patterns = substitution::enumerate(&template, &single("Sr", 3)).unwrap();
        assert_eq!(patterns.len(), 3);
    }

    #[test]
    fn wurtzite_cation_sites_are_equivalent() {
        let prototype = Prototype::named("wurtzite").unwrap();
        let template = prototype.sublattice_template("A").unwrap();
        assert_eq!(template.symmetry().generators().len(), 1);
        assert_eq!(
            template.symmetry().orbit(&[0, 1]),
            [vec![0, 1], vec![1, 0]].into_iter().collect()
        );
        let patterns = substitution::enumerate(&template, &single("Cd", 1)).unwrap();
        assert_eq!(patterns.len(), 1);
    }

    #[test]
    fn wurtzite_supercell_keeps_the_operations_that_fit() {
        let prototype = Prototype::named("wurtzite")
            .unwrap()
            .with_repetitions([2, 1, 1])
            .unwrap();
        let template = prototype.sublattice_template("X").unwrap();
        assert_eq!(template.len(), 4);
        // translate-a and the two-fold screw; the six-fold screw needs equal a and b repetitions.
        assert_eq!(template.symmetry().generators().len(), 2);
        assert_eq!(prototype.sublattice_geometry("X").unwrap().site_count(), 4);
    }

    #[test]
    fn spinel_tetrahedral_sites_form_one_orbit() {
        let prototype = Prototype::named("spinel").unwrap();
        let template = prototype.sublattice_template("A").unwrap();
        assert_eq!(template.len(), 8);
        assert_eq!(
            substitution::enumerate(&template, &single("Zn", 1))
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            substitution::enumerate(&template, &single("Zn", 2))
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn unknown_sublattice_is_reported() {
        let prototype = Prototype::named("wurtzite").unwrap();
        assert!(matches!(
            prototype.sublattice_template("B"),
            Err(GeometryError::UnknownSublattice { .. })
        ));
    }
}
