#[cfg(test)]
pub mod test {
    use anyhow::Result;

    use indicatif::ProgressBar;

    use std::collections::{BTreeSet, HashSet};

    use crate::checkpoint::Checkpoint;
    use crate::codec::{decode, encode, try_decode};
    use crate::grid::{position, AdjacencyGraph};
    use crate::groups::{connected_group_sizes, DisjointSet};
    use crate::lines::{line_group_sizes, line_groups};
    use crate::sweep::Sweep;
    use crate::tile::Tile;
    use crate::{enumerator::tally_range, Board, Enumerator, ScoreTally, MAX_INDEX};

    fn sorted(mut sizes: Vec<usize>) -> Vec<usize> {
        sizes.sort_unstable();
        sizes
    }

    #[test]
    pub fn tile_categories() -> Result<()> {
        assert!(Tile::TavernBed.is_tavern());
        assert!(!Tile::Factory.is_tavern());
        assert_eq!(
            Tile::ALL.iter().filter(|tile| tile.is_tavern()).count(),
            4
        );
        for (digit, tile) in Tile::ALL.iter().enumerate() {
            assert_eq!(tile.digit(), digit as u64);
            assert_eq!(Tile::from_digit(digit as u64), Some(*tile));
            assert_eq!(Tile::from_char(tile.to_char())?, *tile);
            assert_eq!(tile.name().parse::<Tile>()?, *tile);
        }
        assert_eq!(Tile::from_digit(9), None);
        assert_eq!("music".parse::<Tile>()?, Tile::TavernMusic);
        assert_eq!("tavern-food".parse::<Tile>()?, Tile::TavernFood);
        assert!("castle".parse::<Tile>().is_err());
        assert!(Tile::from_char('x').is_err());
        Ok(())
    }

    #[test]
    pub fn graph_topology() {
        let graph = AdjacencyGraph::new();
        assert_eq!(graph.node_count(), 16);
        assert_eq!(graph.edge_count(), 24);

        // corners, edges and the middle
        assert_eq!(graph.neighbours(position(0, 0)).collect::<Vec<_>>(), vec![1, 4]);
        assert_eq!(graph.neighbours(position(0, 2)).count(), 3);
        assert_eq!(
            graph.neighbours(position(1, 1)).collect::<Vec<_>>(),
            vec![1, 4, 6, 9]
        );
        assert_eq!(graph.neighbours(position(3, 3)).collect::<Vec<_>>(), vec![11, 14]);

        for node in 0..16 {
            assert!(graph.neighbours(node).all(|other| other != node));
            for other in graph.neighbours(node) {
                assert!(graph.neighbours(other).any(|back| back == node));
            }
        }
    }

    #[test]
    pub fn board_graph_has_fixed_shape() -> Result<()> {
        let board = Board::from_codes(1, "FHOP SBFH OPSB FHOP")?;
        assert_eq!(board.graph().node_count(), 16);
        assert_eq!(board.graph().edge_count(), 24);
        Ok(())
    }

    #[test]
    pub fn board_without_right_number_of_tiles_is_rejected() {
        assert!(Board::new(1, &[]).is_err());
        assert!(Board::new(1, &[Tile::House; 15]).is_err());
        assert!(Board::new(1, &[Tile::House; 17]).is_err());
        assert!(Board::from_codes(1, "FHOPSBFHOPSBFHO").is_err());
        assert!(Board::from_codes(1, "FHOPSBFHOPSBFHOX").is_err());
    }

    #[test]
    pub fn board_with_invalid_ranking_is_rejected() {
        assert!(Board::new(0, &[Tile::House; 16]).is_err());
        assert!(Board::new(4, &[Tile::House; 16]).is_err());
        assert!(Board::new(3, &[Tile::House; 16]).is_ok());
    }

    #[test]
    pub fn factories_by_ranking() -> Result<()> {
        let codes = "FHOP SBFH OPSB FHOP";
        assert_eq!(Board::from_codes(1, codes)?.score_factories(), 3 * 4);
        assert_eq!(Board::from_codes(2, codes)?.score_factories(), 3 * 3);
        assert_eq!(Board::from_codes(3, codes)?.score_factories(), 3 * 2);
        Ok(())
    }

    #[test]
    pub fn houses() -> Result<()> {
        // (0,3) counts every other category, (1,3) is next to a factory
        let board = Board::from_codes(1, "FDOH SMFH OPSB FEOP")?;
        assert_eq!(board.score_houses(), 6);

        let all_houses = Board::new(1, &[Tile::House; 16])?;
        assert_eq!(all_houses.score_houses(), 0);
        Ok(())
    }

    #[test]
    pub fn houses_count_taverns_once() -> Result<()> {
        // shops, parks and one category of taverns despite three tavern kinds
        let board = Board::from_codes(1, "HBDE SSPP PPPP PPPP")?;
        assert_eq!(board.score_houses(), 3);
        Ok(())
    }

    #[test]
    pub fn office_sets() -> Result<()> {
        let board = Board::new(1, &[Tile::Office; 16])?;
        assert_eq!(board.score_offices(), 52);

        // the only tavern is not next to any office
        let board = Board::from_codes(1, "OOOO OOOO SSSS SDSS")?;
        assert_eq!(board.score_offices(), 24);
        Ok(())
    }

    #[test]
    pub fn office_only_gets_bonus_once_for_tavern() -> Result<()> {
        let board = Board::from_codes(1, "DODD DDDD DDDD DDDD")?;
        assert_eq!(board.score_offices(), 2);
        Ok(())
    }

    #[test]
    pub fn two_offices_can_get_bonus_from_same_tavern() -> Result<()> {
        let board = Board::from_codes(1, "FOFF FDFF FOFF FFFF")?;
        // 3 for the pair + 2 bonus
        assert_eq!(board.score_offices(), 5);
        Ok(())
    }

    #[test]
    pub fn park_group_sizes() -> Result<()> {
        let board = Board::from_codes(1, "FPOP SPFP PPSB FHOP")?;
        assert_eq!(sorted(board.park_group_sizes()), vec![1, 2, 4]);
        Ok(())
    }

    #[test]
    pub fn parks_scored() -> Result<()> {
        let board = Board::from_codes(2, "FPOP SPFP PPSB FHOP")?;
        // 13 + 8 + 2
        assert_eq!(board.score_parks(), 23);

        let all_parks = Board::new(1, &[Tile::Park; 16])?;
        assert_eq!(all_parks.park_group_sizes(), vec![16]);
        assert_eq!(all_parks.score_parks(), 25);
        Ok(())
    }

    #[test]
    pub fn park_groups_join_through_later_tiles() {
        let graph = AdjacencyGraph::new();
        // a U shape whose arms only meet along the bottom row
        let members = [0, 3, 4, 7, 8, 11, 12, 13, 14, 15]
            .iter()
            .fold(0u16, |mask, &position| mask | 1u16 << position);
        assert_eq!(connected_group_sizes(members, &graph), vec![10]);

        // diagonal neighbours are not connected
        let diagonal = 1u16 << position(0, 0) | 1u16 << position(1, 1) | 1u16 << position(2, 2);
        assert_eq!(connected_group_sizes(diagonal, &graph), vec![1, 1, 1]);
        assert!(connected_group_sizes(0, &graph).is_empty());
    }

    #[test]
    pub fn disjoint_set() {
        let mut sets = DisjointSet::new();
        assert_eq!(sets.set_size(5), 1);
        sets.union(0, 1);
        sets.union(2, 3);
        assert_ne!(sets.find(0), sets.find(2));
        sets.union(1, 3);
        assert_eq!(sets.find(0), sets.find(2));
        assert_eq!(sets.set_size(3), 4);
        // merging a set with itself changes nothing
        sets.union(0, 2);
        assert_eq!(sets.set_size(0), 4);
    }

    #[test]
    pub fn shops_in_l_shape() -> Result<()> {
        let board = Board::from_codes(1, "SSSS SHOM SPOO SPHP")?;
        assert_eq!(sorted(board.shop_group_sizes()), vec![3, 4]);
        Ok(())
    }

    #[test]
    pub fn shops_in_t_shape() -> Result<()> {
        let board = Board::from_codes(1, "PPSP SSSS PPSP PPSP")?;
        assert_eq!(sorted(board.shop_group_sizes()), vec![1, 2, 4]);
        Ok(())
    }

    #[test]
    pub fn shops_in_t_shape_with_extra() -> Result<()> {
        let board = Board::from_codes(1, "PPSP SSSS PSSP PPSP")?;
        assert_eq!(sorted(board.shop_group_sizes()), vec![1, 1, 2, 4]);
        Ok(())
    }

    #[test]
    pub fn shops_in_plus_shape_share_no_tile() -> Result<()> {
        let board = Board::from_codes(1, "PSPP SSSP PSPP PPPP")?;
        let shops = board.mask(Tile::is_shop);
        let groups = line_groups(shops);

        // the column through the middle claims the crossing first
        assert_eq!(sorted(board.shop_group_sizes()), vec![1, 1, 3]);
        assert_eq!(groups.iter().fold(0, |all, group| all | group), shops);
        for (i, a) in groups.iter().enumerate() {
            for b in groups.iter().skip(i + 1) {
                assert_eq!(a & b, 0);
            }
        }
        assert_eq!(
            board.shop_group_sizes().iter().sum::<usize>(),
            shops.count_ones() as usize
        );
        Ok(())
    }

    #[test]
    pub fn shop_runs_of_equal_length_stay_in_row() {
        // (0,0) starts a row of two and a column of two
        let corner = 1u16 << position(0, 0) | 1u16 << position(0, 1) | 1u16 << position(1, 0);
        assert_eq!(line_groups(corner)[0], 1u16 << position(0, 0) | 1u16 << position(0, 1));
        assert_eq!(line_group_sizes(corner), vec![2, 1]);

        assert_eq!(line_group_sizes(u16::MAX), vec![4, 4, 4, 4]);
        assert!(line_group_sizes(0).is_empty());
    }

    #[test]
    pub fn shop_lines_cap_at_four() -> Result<()> {
        let board = Board::new(1, &[Tile::Shop; 16])?;
        assert_eq!(board.score_shops(), 4 * 16);
        Ok(())
    }

    #[test]
    pub fn all_the_same_type_of_tavern_only_scores_one_per() -> Result<()> {
        let board = Board::new(1, &[Tile::TavernBed; 16])?;
        assert_eq!(board.score_taverns(), 16);
        Ok(())
    }

    #[test]
    pub fn partial_tavern_sets() -> Result<()> {
        // 4 beds, 3 music, 2 food, 1 drink: 17 + 9 + 4 + 1
        let board = Board::from_codes(1, "BBBB MMMF EEFF DFFF")?;
        assert_eq!(board.score_taverns(), 31);
        Ok(())
    }

    #[test]
    pub fn city_scoring_examples() -> Result<()> {
        let examples = [
            (1, "SSSS HHOM OPOO OPHP", 56),
            (1, "MFFF PPFP SSMP HHHF", 52),
            (2, "MDFF HEFP SHBP HHHO", 62),
            (3, "MDFF OEOB OOOO SSSS", 62),
            (3, "MDHH SEOB SOHH SFPP", 62),
            (1, "FSFF PFPP FBHP PPHH", 57),
        ];
        for &(ranking, codes, expected) in examples.iter() {
            let board = Board::from_codes(ranking, codes)?;
            assert_eq!(board.score(), expected, "{}", codes);
        }
        Ok(())
    }

    #[test]
    pub fn breakdown_sums_to_score() -> Result<()> {
        let board = Board::from_codes(1, "FDOP SMFH OPSB FEOP")?;
        let breakdown = board.breakdown();
        assert_eq!(breakdown.factories, 12);
        assert_eq!(breakdown.houses, 1);
        assert_eq!(breakdown.offices, 8);
        assert_eq!(breakdown.parks, 6);
        assert_eq!(breakdown.shops, 4);
        assert_eq!(breakdown.taverns, 17);
        assert_eq!(breakdown.total(), 48);
        assert_eq!(board.score(), 48);
        // scoring is pure
        assert_eq!(board.score(), board.score());
        Ok(())
    }

    #[test]
    pub fn board_can_render_itself() -> Result<()> {
        let expected = [
            "#1 in factories; Score: 48",
            "┌---------------------------------------------------┐",
            "|            |            |            |            |",
            "|  FACTORY   |TAVERN_DRINK|   OFFICE   |    PARK    |",
            "|            |            |            |            |",
            "|------------|------------|------------|------------|",
            "|            |            |            |            |",
            "|    SHOP    |TAVERN_MUSIC|  FACTORY   |   HOUSE    |",
            "|            |            |            |            |",
            "|------------|------------|------------|------------|",
            "|            |            |            |            |",
            "|   OFFICE   |    PARK    |    SHOP    | TAVERN_BED |",
            "|            |            |            |            |",
            "|------------|------------|------------|------------|",
            "|            |            |            |            |",
            "|  FACTORY   |TAVERN_FOOD |   OFFICE   |    PARK    |",
            "|            |            |            |            |",
            "└---------------------------------------------------┘",
        ]
        .join("\n");
        let board = Board::from_codes(1, "FDOP SMFH OPSB FEOP")?;
        assert_eq!(board.render(), expected);
        Ok(())
    }

    #[test]
    pub fn decode_boundaries() {
        let first = decode(0);
        assert!(first.tiles().iter().all(|&tile| tile == Tile::Factory));
        assert_eq!(first.factory_ranking(), 1);

        let second = decode(2);
        assert!(second.tiles().iter().all(|&tile| tile == Tile::Factory));
        assert_eq!(second.factory_ranking(), 3);

        let third = decode(3);
        assert_eq!(third.factory_ranking(), 1);
        assert_eq!(third.tile(3, 3), Tile::House);
        assert!(third.tiles()[..15].iter().all(|&tile| tile == Tile::Factory));

        let last = decode(MAX_INDEX - 1);
        assert!(last.tiles().iter().all(|&tile| tile == Tile::TavernMusic));
        assert_eq!(last.factory_ranking(), 3);
    }

    #[test]
    pub fn decode_is_deterministic_and_checked() -> Result<()> {
        assert_eq!(decode(123_456_789), decode(123_456_789));
        assert_eq!(try_decode(MAX_INDEX - 1)?, decode(MAX_INDEX - 1));
        assert!(try_decode(MAX_INDEX).is_err());
        assert!(try_decode(u64::MAX).is_err());
        Ok(())
    }

    #[test]
    pub fn encode_inverts_decode() -> Result<()> {
        for &index in [0, 1, 2, 3, 90, 123_456_789, MAX_INDEX / 2, MAX_INDEX - 1].iter() {
            assert_eq!(encode(&decode(index)), index);
        }
        let board = Board::from_codes(2, "MDFF HEFP SHBP HHHO")?;
        assert_eq!(decode(encode(&board)), board);
        Ok(())
    }

    #[test]
    pub fn tally_tracks_ties_and_new_bests() {
        let mut tally = ScoreTally::new();
        assert_eq!(tally.best_score(), None);

        assert!(tally.record(10, 20));
        assert!(!tally.record(11, 5));
        assert!(tally.record(12, 20));
        assert_eq!(tally.best_score(), Some(20));
        assert_eq!(tally.best_indices().iter().copied().collect::<Vec<_>>(), vec![10, 12]);

        // a strictly higher score clears the ties
        assert!(tally.record(13, 21));
        assert_eq!(tally.best_indices().iter().copied().collect::<Vec<_>>(), vec![13]);
        assert_eq!(tally.count(20), 2);
        assert_eq!(tally.boards_scored(), 4);
    }

    #[test]
    pub fn tally_merge_matches_single_fold() {
        let results: Vec<(u64, u32)> = Enumerator::sequential(0..600).collect();
        let whole: ScoreTally = results.iter().copied().collect();

        let (left, right) = results.split_at(250);
        let mut merged: ScoreTally = right.iter().copied().collect();
        merged.merge(left.iter().copied().collect());
        assert_eq!(merged, whole);

        merged.merge(ScoreTally::new());
        assert_eq!(merged, whole);
        assert_eq!(ScoreTally::new().merged(whole.clone()), whole);
    }

    #[test]
    pub fn sequential_fold_over_small_range() {
        let range = 0..2000;
        let tally: ScoreTally = Enumerator::sequential(range.clone()).collect();

        assert_eq!(tally.boards_scored(), range.end - range.start);
        assert_eq!(tally.best_score(), Some(64));
        assert_eq!(
            tally.best_indices().iter().copied().collect::<Vec<_>>(),
            vec![0, 90, 810, 819]
        );
        for &index in tally.best_indices() {
            assert_eq!(Some(decode(index).score()), tally.best_score());
        }
        assert_eq!(tally_range(range), tally);
    }

    #[test]
    pub fn enumerator_resumes_from_any_index() {
        let mut enumerator = Enumerator::sequential(100..110);
        let first: Vec<_> = enumerator.by_ref().take(4).collect();
        assert_eq!(enumerator.position(), Some(104));

        let rest: Vec<_> = Enumerator::sequential(104..110).collect();
        let whole: Vec<_> = Enumerator::sequential(100..110).collect();
        assert_eq!([first, rest].concat(), whole);
        assert_eq!(whole.len(), 10);
    }

    #[test]
    pub fn enumerator_stops_at_last_board() {
        let indices: Vec<u64> = Enumerator::starting_at(MAX_INDEX - 2)
            .map(|(index, _)| index)
            .collect();
        assert_eq!(indices, vec![MAX_INDEX - 2, MAX_INDEX - 1]);
        assert_eq!(Enumerator::sequential(5..5).count(), 0);
        assert_eq!(Enumerator::sequential(MAX_INDEX..u64::MAX).count(), 0);
    }

    #[test]
    pub fn sampled_enumerator_is_seeded() {
        let a: Vec<_> = Enumerator::sampled(7).take(50).collect();
        let b: Vec<_> = Enumerator::sampled(7).take(50).collect();
        assert_eq!(a, b);
        assert!(a.iter().all(|&(index, score)| index < MAX_INDEX && decode(index).score() == score));
        assert_eq!(Enumerator::sampled(7).position(), None);
    }

    #[test]
    pub fn checkpoint_round_trip() -> Result<()> {
        let tally: ScoreTally = Enumerator::sequential(40..340).collect();
        let checkpoint = Checkpoint {
            start: 40,
            cursor: 340,
            end: 1000,
            tally,
        };
        let mut bytes = Vec::new();
        checkpoint.write_to(&mut bytes)?;
        assert_eq!(&bytes[..4], b"CITY");
        assert_eq!(Checkpoint::read_from(&mut bytes.as_slice())?, checkpoint);

        let empty = Checkpoint {
            start: 5,
            cursor: 5,
            end: 5,
            tally: ScoreTally::new(),
        };
        bytes.clear();
        empty.write_to(&mut bytes)?;
        assert_eq!(Checkpoint::read_from(&mut bytes.as_slice())?, empty);
        Ok(())
    }

    #[test]
    pub fn corrupt_checkpoints_are_rejected() -> Result<()> {
        let checkpoint = Checkpoint {
            start: 0,
            cursor: 30,
            end: 60,
            tally: Enumerator::sequential(0..30).collect(),
        };
        let mut bytes = Vec::new();
        checkpoint.write_to(&mut bytes)?;

        let mut bad_magic = bytes.clone();
        bad_magic[0] = b'X';
        assert!(Checkpoint::read_from(&mut bad_magic.as_slice()).is_err());

        let truncated = &bytes[..bytes.len() - 3];
        assert!(Checkpoint::read_from(&mut &truncated[..]).is_err());

        // claims more indices swept than boards recorded
        let mut wrong_cursor = checkpoint.clone();
        wrong_cursor.cursor = 31;
        bytes.clear();
        wrong_cursor.write_to(&mut bytes)?;
        assert!(Checkpoint::read_from(&mut bytes.as_slice()).is_err());
        Ok(())
    }

    #[test]
    pub fn sweep_matches_sequential_fold() -> Result<()> {
        let range = 1000..4000;
        let mut sweep = Sweep::new(range.clone())
            .with_segment_size(700)
            .with_chunk_size(64);
        sweep.run(None)?;

        assert!(sweep.is_finished());
        assert_eq!(sweep.cursor(), range.end);
        let expected: ScoreTally = Enumerator::sequential(range).collect();
        assert_eq!(sweep.into_tally(), expected);
        Ok(())
    }

    #[test]
    pub fn interrupted_sweep_resumes_from_checkpoint() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sweep.bin");

        let mut first = Sweep::new(0..3000)
            .with_checkpoint_path(&path)
            .with_segment_size(500)
            .with_chunk_size(100);
        first.run(Some(1200))?;
        assert_eq!(first.cursor(), 1200);
        assert!(!first.is_finished());

        let saved = Checkpoint::load(&path)?;
        assert_eq!(saved.cursor, 1200);
        assert_eq!(saved.tally, *first.tally());

        let mut resumed = Sweep::resume(saved)
            .with_checkpoint_path(&path)
            .with_segment_size(900);
        resumed.run(None)?;
        assert!(resumed.is_finished());

        let expected: ScoreTally = Enumerator::sequential(0..3000).collect();
        assert_eq!(*resumed.tally(), expected);
        assert_eq!(Checkpoint::load(&path)?.tally, expected);
        Ok(())
    }

    #[test]
    pub fn sweep_best_boards_score_the_maximum() -> Result<()> {
        let mut sweep = Sweep::new(MAX_INDEX - 500..MAX_INDEX).with_chunk_size(37);
        sweep.run(None)?;
        let tally = sweep.tally();
        let best = tally.best_score();
        assert!(best.is_some());
        let best_indices: BTreeSet<u64> = (MAX_INDEX - 500..MAX_INDEX)
            .filter(|&index| Some(decode(index).score()) == best)
            .collect();
        assert_eq!(*tally.best_indices(), best_indices);
        Ok(())
    }

    #[test]
    pub fn equal_boards_hash_alike() -> Result<()> {
        let boards: HashSet<Board> = vec![decode(90), decode(90), Board::from_codes(1, "FFFF FFFF FFFF FFFF")?]
            .into_iter()
            .collect();
        assert_eq!(boards.len(), 2);
        assert!(boards.contains(&decode(0)));
        Ok(())
    }

    #[test]
    pub fn sweep_with_oversized_chunks() -> Result<()> {
        let mut sweep = Sweep::new(5..10).with_chunk_size(u64::MAX);
        sweep.run(None)?;
        assert_eq!(sweep.tally().boards_scored(), 5);
        let expected: ScoreTally = Enumerator::sequential(5..10).collect();
        assert_eq!(*sweep.tally(), expected);
        Ok(())
    }

    #[test]
    pub fn scoring_a_segment_leaves_the_sweep_unchanged() -> Result<()> {
        let mut sweep = Sweep::new(0..1000).with_segment_size(300).with_chunk_size(64);
        sweep.run(Some(300))?;
        let before = sweep.checkpoint();

        let segment = sweep.score_segment(700, &ProgressBar::hidden())?;
        assert_eq!(segment.boards_scored(), 400);
        assert_eq!(segment, Enumerator::sequential(300..700).collect::<ScoreTally>());
        assert_eq!(sweep.checkpoint(), before);

        sweep.run(None)?;
        let expected: ScoreTally = Enumerator::sequential(0..1000).collect();
        assert_eq!(*sweep.tally(), expected);
        Ok(())
    }
}
