use std::collections::BTreeMap;

use serde::Serialize;

use crate::records::SupervisionType;

const RUBRIC_MAX_PER_ITEM: u32 = 4;
const RUBRIC_MIN_PER_ITEM: u32 = 1;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RubricItem {
    pub id: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RubricSection {
    pub title: &'static str,
    pub items: &'static [RubricItem],
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RubricGroup {
    pub title: &'static str,
    pub sections: &'static [RubricSection],
}

/// Fixed scoring instrument. Flat instruments are a single group with a single section.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Instrument {
    pub kind: SupervisionType,
    pub title: &'static str,
    pub max_per_item: u32,
    pub groups: &'static [RubricGroup],
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{item} is not an item of the {instrument} instrument")]
pub struct UnknownRubricItem {
    pub instrument: &'static str,
    pub item: String,
}

impl Instrument {
    pub fn for_type(kind: SupervisionType) -> &'static Instrument {
        match kind {
            SupervisionType::Administration => &ADMINISTRATION,
            SupervisionType::Observation => &OBSERVATION,
            SupervisionType::Planning => &PLANNING,
            SupervisionType::PlanningDeep => &PLANNING_DEEP,
        }
    }

    pub fn items(&self) -> impl Iterator<Item = &'static RubricItem> {
        self.groups
            .iter()
            .flat_map(|group| group.sections.iter())
            .flat_map(|section| section.items.iter())
    }

    pub fn item_count(&self) -> usize {
        self.items().count()
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.items().any(|item| item.id == item_id)
    }

    /// Entry-time validation: unknown ids are rejected and values clamped into 1..=max.
    pub fn sanitize(
        &self,
        scores: &BTreeMap<String, u32>,
    ) -> Result<BTreeMap<String, u32>, UnknownRubricItem> {
        scores
            .iter()
            .map(|(item, value)| {
                if !self.contains(item) {
                    return Err(UnknownRubricItem {
                        instrument: self.title,
                        item: item.clone(),
                    });
                }
                let clamped = (*value).clamp(RUBRIC_MIN_PER_ITEM, self.max_per_item);
                Ok((item.clone(), clamped))
            })
            .collect()
    }
}

static ADMINISTRATION: Instrument = Instrument {
    kind: SupervisionType::Administration,
    title: "Instrumen Supervisi Administrasi Pembelajaran",
    max_per_item: RUBRIC_MAX_PER_ITEM,
    groups: &[RubricGroup {
        title: "Kelengkapan Administrasi",
        sections: &[RubricSection {
            title: "Dokumen Guru",
            items: &[
                RubricItem { id: "adm_01", label: "Kalender Pendidikan" },
                RubricItem { id: "adm_02", label: "Program Tahunan" },
                RubricItem { id: "adm_03", label: "Program Semester" },
                RubricItem { id: "adm_04", label: "Capaian Pembelajaran" },
                RubricItem { id: "adm_05", label: "Alur Tujuan Pembelajaran" },
                RubricItem { id: "adm_06", label: "Modul Ajar" },
                RubricItem { id: "adm_07", label: "Jadwal Pelajaran" },
                RubricItem { id: "adm_08", label: "Agenda Harian Guru" },
                RubricItem { id: "adm_09", label: "Daftar Hadir Peserta Didik" },
                RubricItem { id: "adm_10", label: "Daftar Nilai" },
                RubricItem { id: "adm_11", label: "Kriteria Ketercapaian Tujuan Pembelajaran" },
                RubricItem { id: "adm_12", label: "Asesmen Diagnostik" },
                RubricItem { id: "adm_13", label: "Asesmen Formatif" },
                RubricItem { id: "adm_14", label: "Asesmen Sumatif" },
                RubricItem { id: "adm_15", label: "Analisis Hasil Asesmen" },
                RubricItem { id: "adm_16", label: "Program Remedial" },
                RubricItem { id: "adm_17", label: "Program Pengayaan" },
                RubricItem { id: "adm_18", label: "Bank Soal" },
                RubricItem { id: "adm_19", label: "Buku Pegangan Guru" },
                RubricItem { id: "adm_20", label: "Buku Teks Peserta Didik" },
                RubricItem { id: "adm_21", label: "Jurnal Refleksi Pembelajaran" },
                RubricItem { id: "adm_22", label: "Catatan Perkembangan Peserta Didik" },
            ],
        }],
    }],
};

static OBSERVATION: Instrument = Instrument {
    kind: SupervisionType::Observation,
    title: "Instrumen Observasi Pelaksanaan Pembelajaran",
    max_per_item: RUBRIC_MAX_PER_ITEM,
    groups: &[
        RubricGroup {
            title: "Kegiatan Pendahuluan",
            sections: &[
                RubricSection {
                    title: "Orientasi",
                    items: &[
                        RubricItem { id: "obs_1_1", label: "Menyiapkan peserta didik secara psikis dan fisik" },
                        RubricItem { id: "obs_1_2", label: "Memeriksa kehadiran peserta didik" },
                        RubricItem { id: "obs_1_3", label: "Menyampaikan tujuan pembelajaran" },
                    ],
                },
                RubricSection {
                    title: "Apersepsi dan Motivasi",
                    items: &[
                        RubricItem { id: "obs_1_4", label: "Mengaitkan materi dengan pengalaman peserta didik" },
                        RubricItem { id: "obs_1_5", label: "Memberikan motivasi belajar" },
                    ],
                },
            ],
        },
        RubricGroup {
            title: "Kegiatan Inti",
            sections: &[
                RubricSection {
                    title: "Penguasaan Materi",
                    items: &[
                        RubricItem { id: "obs_2_1", label: "Menyajikan materi sesuai tujuan pembelajaran" },
                        RubricItem { id: "obs_2_2", label: "Mengaitkan materi dengan pengetahuan lain yang relevan" },
                        RubricItem { id: "obs_2_3", label: "Menyajikan materi secara sistematis" },
                    ],
                },
                RubricSection {
                    title: "Strategi Pembelajaran",
                    items: &[
                        RubricItem { id: "obs_2_4", label: "Melaksanakan pembelajaran sesuai modul ajar" },
                        RubricItem { id: "obs_2_5", label: "Menerapkan pembelajaran berdiferensiasi" },
                        RubricItem { id: "obs_2_6", label: "Mengelola kelas dengan efektif" },
                        RubricItem { id: "obs_2_7", label: "Mengalokasikan waktu sesuai rencana" },
                    ],
                },
                RubricSection {
                    title: "Pemanfaatan Media dan Sumber Belajar",
                    items: &[
                        RubricItem { id: "obs_2_8", label: "Menggunakan media pembelajaran yang sesuai" },
                        RubricItem { id: "obs_2_9", label: "Memanfaatkan teknologi informasi" },
                    ],
                },
                RubricSection {
                    title: "Pelibatan Peserta Didik",
                    items: &[
                        RubricItem { id: "obs_2_10", label: "Menumbuhkan partisipasi aktif peserta didik" },
                        RubricItem { id: "obs_2_11", label: "Merespons pertanyaan peserta didik" },
                        RubricItem { id: "obs_2_12", label: "Menumbuhkan keceriaan dan antusiasme belajar" },
                    ],
                },
            ],
        },
        RubricGroup {
            title: "Kegiatan Penutup",
            sections: &[
                RubricSection {
                    title: "Refleksi",
                    items: &[
                        RubricItem { id: "obs_3_1", label: "Memfasilitasi refleksi bersama peserta didik" },
                        RubricItem { id: "obs_3_2", label: "Menyampaikan rencana pembelajaran berikutnya" },
                    ],
                },
                RubricSection {
                    title: "Asesmen",
                    items: &[
                        RubricItem { id: "obs_3_3", label: "Melaksanakan asesmen formatif" },
                        RubricItem { id: "obs_3_4", label: "Memberikan umpan balik hasil belajar" },
                    ],
                },
            ],
        },
    ],
};

static PLANNING: Instrument = Instrument {
    kind: SupervisionType::Planning,
    title: "Instrumen Telaah Perencanaan Pembelajaran",
    max_per_item: RUBRIC_MAX_PER_ITEM,
    groups: &[
        RubricGroup {
            title: "Identitas dan Tujuan",
            sections: &[
                RubricSection {
                    title: "Identitas Modul",
                    items: &[
                        RubricItem { id: "pln_1_1", label: "Kelengkapan identitas modul" },
                        RubricItem { id: "pln_1_2", label: "Kompetensi awal peserta didik" },
                        RubricItem { id: "pln_1_3", label: "Sarana dan prasarana" },
                    ],
                },
                RubricSection {
                    title: "Tujuan Pembelajaran",
                    items: &[
                        RubricItem { id: "pln_1_4", label: "Kesesuaian tujuan dengan capaian pembelajaran" },
                        RubricItem { id: "pln_1_5", label: "Rumusan tujuan terukur" },
                        RubricItem { id: "pln_1_6", label: "Pemahaman bermakna dan pertanyaan pemantik" },
                    ],
                },
            ],
        },
        RubricGroup {
            title: "Kegiatan Pembelajaran",
            sections: &[
                RubricSection {
                    title: "Langkah Pembelajaran",
                    items: &[
                        RubricItem { id: "pln_2_1", label: "Kegiatan pendahuluan" },
                        RubricItem { id: "pln_2_2", label: "Kegiatan inti berpusat pada peserta didik" },
                        RubricItem { id: "pln_2_3", label: "Kegiatan penutup" },
                        RubricItem { id: "pln_2_4", label: "Alokasi waktu tiap kegiatan" },
                    ],
                },
                RubricSection {
                    title: "Diferensiasi",
                    items: &[
                        RubricItem { id: "pln_2_5", label: "Diferensiasi konten, proses, atau produk" },
                        RubricItem { id: "pln_2_6", label: "Layanan bagi peserta didik berkebutuhan khusus" },
                    ],
                },
            ],
        },
        RubricGroup {
            title: "Asesmen dan Lampiran",
            sections: &[
                RubricSection {
                    title: "Asesmen",
                    items: &[
                        RubricItem { id: "pln_3_1", label: "Asesmen diagnostik" },
                        RubricItem { id: "pln_3_2", label: "Asesmen formatif dan sumatif" },
                        RubricItem { id: "pln_3_3", label: "Rubrik penilaian" },
                    ],
                },
                RubricSection {
                    title: "Lampiran",
                    items: &[
                        RubricItem { id: "pln_3_4", label: "Lembar kerja peserta didik" },
                        RubricItem { id: "pln_3_5", label: "Bahan bacaan guru dan peserta didik" },
                    ],
                },
            ],
        },
    ],
};

static PLANNING_DEEP: Instrument = Instrument {
    kind: SupervisionType::PlanningDeep,
    title: "Instrumen Telaah Perencanaan Pembelajaran Mendalam",
    max_per_item: RUBRIC_MAX_PER_ITEM,
    groups: &[
        RubricGroup {
            title: "Identifikasi",
            sections: &[
                RubricSection {
                    title: "Peserta Didik",
                    items: &[
                        RubricItem { id: "pdm_1_1", label: "Analisis kesiapan belajar peserta didik" },
                        RubricItem { id: "pdm_1_2", label: "Analisis minat dan kebutuhan belajar" },
                    ],
                },
                RubricSection {
                    title: "Materi Pelajaran",
                    items: &[
                        RubricItem { id: "pdm_1_3", label: "Relevansi materi dengan kehidupan nyata" },
                        RubricItem { id: "pdm_1_4", label: "Tingkat kompleksitas materi" },
                    ],
                },
                RubricSection {
                    title: "Dimensi Profil Lulusan",
                    items: &[
                        RubricItem { id: "pdm_1_5", label: "Pemilihan dimensi profil lulusan" },
                        RubricItem { id: "pdm_1_6", label: "Keterkaitan dimensi dengan tujuan" },
                    ],
                },
            ],
        },
        RubricGroup {
            title: "Desain Pembelajaran",
            sections: &[RubricSection {
                title: "Kerangka Pembelajaran",
                items: &[
                    RubricItem { id: "pdm_2_1", label: "Praktik pedagogis" },
                    RubricItem { id: "pdm_2_2", label: "Kemitraan pembelajaran" },
                    RubricItem { id: "pdm_2_3", label: "Lingkungan pembelajaran" },
                    RubricItem { id: "pdm_2_4", label: "Pemanfaatan digital" },
                ],
            }],
        },
        RubricGroup {
            title: "Pengalaman Belajar",
            sections: &[
                RubricSection {
                    title: "Berkesadaran",
                    items: &[
                        RubricItem { id: "pdm_3_1", label: "Peserta didik memahami tujuan belajarnya" },
                        RubricItem { id: "pdm_3_2", label: "Refleksi diri selama proses belajar" },
                    ],
                },
                RubricSection {
                    title: "Bermakna",
                    items: &[
                        RubricItem { id: "pdm_3_3", label: "Penerapan pengetahuan pada konteks nyata" },
                        RubricItem { id: "pdm_3_4", label: "Keterhubungan antar konsep" },
                    ],
                },
                RubricSection {
                    title: "Menggembirakan",
                    items: &[
                        RubricItem { id: "pdm_3_5", label: "Suasana belajar yang positif" },
                        RubricItem { id: "pdm_3_6", label: "Tantangan belajar yang memotivasi" },
                    ],
                },
            ],
        },
        RubricGroup {
            title: "Asesmen Pembelajaran",
            sections: &[RubricSection {
                title: "Asesmen",
                items: &[
                    RubricItem { id: "pdm_4_1", label: "Asesmen awal pembelajaran" },
                    RubricItem { id: "pdm_4_2", label: "Asesmen proses pembelajaran" },
                    RubricItem { id: "pdm_4_3", label: "Asesmen akhir pembelajaran" },
                ],
            }],
        },
    ],
};
